//! Pure predicate: does a date satisfy a rule relative to a reference date?
//!
//! Used only for the "is the starting date itself already a valid
//! occurrence" shortcut in the calculator, so the branches are deliberately
//! narrow: they answer same-day inclusion, not general rule expansion.

use chrono::{DateTime, Datelike, Utc};

use crate::models::{Frequency, RecurrenceRule};

/// Returns whether `candidate` falls on the rule's pattern, taking
/// `reference` as the anchor occurrence. All comparisons are on UTC
/// calendar components.
pub fn matches(
    candidate: DateTime<Utc>,
    rule: &RecurrenceRule,
    reference: DateTime<Utc>,
) -> bool {
    let candidate_day = candidate.date_naive();
    let reference_day = reference.date_naive();

    match rule.frequency {
        Frequency::Daily => {
            if candidate_day == reference_day {
                return true;
            }
            let days = (candidate_day - reference_day).num_days();
            days > 0 && days % i64::from(rule.interval) == 0
        }
        Frequency::Weekly if !rule.by_day.is_empty() => {
            // Interval is not applied on this branch; see the calculator's
            // weekly BYDAY scan, which shares the same behavior.
            rule.weekdays().contains(&candidate.weekday())
        }
        Frequency::Weekly => {
            if candidate.weekday() != reference.weekday() {
                return false;
            }
            let days = (candidate_day - reference_day).num_days();
            days >= 0 && (days / 7) % i64::from(rule.interval) == 0
        }
        Frequency::Monthly if !rule.by_month_day.is_empty() => {
            rule.by_month_day.contains(&(candidate.day() as i32))
        }
        Frequency::Monthly => candidate.day() == reference.day(),
        Frequency::Yearly => {
            candidate.month() == reference.month() && candidate.day() == reference.day()
        }
    }
}
