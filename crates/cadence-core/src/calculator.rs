//! Next-occurrence calculation.
//!
//! All arithmetic operates on UTC calendar components (`with_year` /
//! `with_month` / `with_day` plus whole-day durations), never on raw
//! millisecond offsets, so results do not drift across DST boundaries.
//! Time-of-day is carried over from the starting date unchanged.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::matcher;
use crate::models::{Frequency, RecurrenceRule};

/// Computes the next valid occurrence for a recurrence rule.
///
/// `None` is a first-class outcome meaning "no further occurrence": an
/// unparseable rule, an exhausted or out-of-bound UNTIL, or an empty
/// effective weekday set all land there. Nothing in here is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextDateCalculator<C: Clock = SystemClock> {
    clock: C,
}

impl NextDateCalculator {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> NextDateCalculator<C> {
    /// Builds a calculator around an injected clock. The clock is consulted
    /// only by the `include_from_date` fast path.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Returns the next occurrence of `rule_text` after `from`.
    ///
    /// With `include_from_date` set, a `from` that falls on the current
    /// calendar day and already satisfies the rule's pattern is returned
    /// unchanged, so that previewing "the next due date as of right now"
    /// does not skip an occurrence due today.
    pub fn next_occurrence(
        &self,
        rule_text: &str,
        from: DateTime<Utc>,
        include_from_date: bool,
    ) -> Option<DateTime<Utc>> {
        let rule = RecurrenceRule::parse(rule_text)?;

        if include_from_date {
            let today = self.clock.now();
            if from.date_naive() == today.date_naive() && matcher::matches(from, &rule, from) {
                if let Some(hit) = check_until(&rule, from) {
                    return Some(hit);
                }
                // Past the UNTIL bound (or the bound is unusable); normal
                // advancement re-applies the same check below.
            }
        }

        let next = advance(&rule, from)?;
        let bounded = check_until(&rule, next);
        if bounded.is_none() {
            debug!(rule = rule_text, %from, "no further occurrence");
        }
        bounded
    }
}

/// One step of calendar advancement, ignoring COUNT and UNTIL.
fn advance(rule: &RecurrenceRule, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let interval = i64::from(rule.interval);
    match rule.frequency {
        Frequency::Daily => from.checked_add_signed(Duration::days(interval)),
        Frequency::Weekly if !rule.by_day.is_empty() => {
            let targets = rule.weekdays();
            if targets.is_empty() {
                return None;
            }
            // Scan the next seven days and stop at the first weekday in the
            // target set. Interval is not applied on this branch.
            (1..=7)
                .map(|offset| from + Duration::days(offset))
                .find(|candidate| targets.contains(&candidate.weekday()))
        }
        Frequency::Weekly => from.checked_add_signed(Duration::days(7 * interval)),
        Frequency::Monthly => {
            let (year, month) = shift_months(from, rule.interval);
            let last = days_in_month(year, month)?;
            let day = if rule.by_month_day.is_empty() {
                // Month-end clamp: Jan 31 + 1 month lands on the last day
                // of February, not on March 2nd.
                from.day().min(last)
            } else {
                resolve_month_day(&rule.by_month_day, last)?
            };
            rebuild(from, year, month, day)
        }
        Frequency::Yearly => {
            let months: Vec<u32> = rule
                .by_month
                .iter()
                .copied()
                .filter(|m| (1..=12).contains(m))
                .collect();
            let (year, month) = if months.is_empty() {
                (from.year() + rule.interval as i32, from.month())
            } else if let Some(&m) = months.iter().filter(|&&m| m > from.month()).min() {
                // A later month in the current year comes first.
                (from.year(), m)
            } else {
                let earliest = *months.iter().min()?;
                (from.year() + rule.interval as i32, earliest)
            };
            let day = from.day().min(days_in_month(year, month)?);
            rebuild(from, year, month, day)
        }
    }
}

/// Shifts `from`'s year/month forward by `interval` months, handling year
/// rollover.
fn shift_months(from: DateTime<Utc>, interval: u32) -> (i32, u32) {
    let total = from.year() * 12 + from.month0() as i32 + interval as i32;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}

/// Picks the earliest day a BYMONTHDAY set yields in a month with `last`
/// days: `-1` resolves to the last day and larger entries clamp to it.
fn resolve_month_day(set: &[i32], last: u32) -> Option<u32> {
    set.iter()
        .filter_map(|&entry| match entry {
            -1 => Some(last),
            d if d >= 1 => Some((d as u32).min(last)),
            _ => None,
        })
        .min()
}

/// Moves `from` to year/month/day preserving its time-of-day. The day is
/// reset to 1 before the year and month change so that an intermediate
/// short month cannot roll the date over.
fn rebuild(from: DateTime<Utc>, year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    from.with_day(1)?
        .with_year(year)?
        .with_month(month)?
        .with_day(day)
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next.pred_opt()?.day())
}

/// Applies the rule's UNTIL bound to a computed date. No bound passes the
/// date through; a malformed or impossible bound rejects it outright; an
/// in-range date passes (the bound is inclusive, compared date-only).
fn check_until(rule: &RecurrenceRule, candidate: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match &rule.until {
        None => Some(candidate),
        Some(token) => {
            let until = parse_until(token)?;
            if candidate.date_naive() > until {
                None
            } else {
                Some(candidate)
            }
        }
    }
}

/// Validates an UNTIL token: exactly eight digits denoting a real calendar
/// date. `20240231` is rejected as impossible.
fn parse_until(token: &str) -> Option<NaiveDate> {
    if token.len() != 8 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(token, "%Y%m%d").ok()
}
