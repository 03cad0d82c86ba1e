//! Parsing and serialization of the supported `RRULE:` subset.
//!
//! Recognized keys: `FREQ`, `INTERVAL`, `COUNT`, `UNTIL`, `BYDAY`,
//! `BYMONTHDAY`, `BYMONTH`, `BYSETPOS`. Unknown keys are ignored. `UNTIL`
//! and `BYDAY` values are kept raw and validated where they are used.

use chrono::Weekday;
use std::fmt;

use crate::models::{Frequency, RecurrenceRule};

const PREFIX: &str = "RRULE:";

impl RecurrenceRule {
    /// Parses a rule string. Returns `None` when the `RRULE:` prefix is
    /// missing or no valid `FREQ` token is present; a rule without a
    /// frequency is not constructible.
    ///
    /// Pure function: no clock, no caching.
    pub fn parse(text: &str) -> Option<RecurrenceRule> {
        let body = text.strip_prefix(PREFIX)?;

        let mut frequency: Option<Frequency> = None;
        let mut interval: u32 = 1;
        let mut count: Option<u32> = None;
        let mut until: Option<String> = None;
        let mut by_day: Vec<String> = Vec::new();
        let mut by_month_day: Vec<i32> = Vec::new();
        let mut by_month: Vec<u32> = Vec::new();
        let mut by_set_pos: Vec<i32> = Vec::new();

        for pair in body.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "FREQ" => {
                    // An unrecognized frequency leaves FREQ unset rather
                    // than failing the pair.
                    if let Ok(freq) = value.parse::<Frequency>() {
                        frequency = Some(freq);
                    }
                }
                "INTERVAL" => {
                    if let Ok(n) = value.parse::<u32>() {
                        if n >= 1 {
                            interval = n;
                        }
                    }
                }
                "COUNT" => count = value.parse::<u32>().ok(),
                "UNTIL" => until = Some(value.to_string()),
                "BYDAY" => {
                    by_day = value
                        .split(',')
                        .filter(|token| !token.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "BYMONTHDAY" => {
                    by_month_day = value.split(',').filter_map(|v| v.parse().ok()).collect();
                }
                "BYMONTH" => {
                    by_month = value.split(',').filter_map(|v| v.parse().ok()).collect();
                }
                "BYSETPOS" => {
                    by_set_pos = value.split(',').filter_map(|v| v.parse().ok()).collect();
                }
                _ => {}
            }
        }

        Some(RecurrenceRule {
            frequency: frequency?,
            interval,
            count,
            until,
            by_day,
            by_month_day,
            by_month,
            by_set_pos,
        })
    }

    /// Resolves the raw `BYDAY` tokens into weekdays, dropping tokens that
    /// are not one of `SU,MO,TU,WE,TH,FR,SA`. May be empty.
    pub fn weekdays(&self) -> Vec<Weekday> {
        self.by_day
            .iter()
            .filter_map(|token| weekday_from_token(token))
            .collect()
    }

    /// Returns a copy of this rule with `COUNT` reduced by one. The caller
    /// is responsible for treating `COUNT <= 1` as the final occurrence
    /// before asking for a decrement.
    pub fn decrement_count(&self) -> RecurrenceRule {
        RecurrenceRule {
            count: self.count.map(|c| c.saturating_sub(1)),
            ..self.clone()
        }
    }
}

fn weekday_from_token(token: &str) -> Option<Weekday> {
    match token {
        "SU" => Some(Weekday::Sun),
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Canonical serialization. `FREQ` comes first, `INTERVAL` is written only
/// when it differs from the default, and the remaining keys appear in a
/// fixed order. A parsed rule survives a round trip through this form
/// field for field.
impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}FREQ={}", PREFIX, self.frequency)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        if let Some(until) = &self.until {
            write!(f, ";UNTIL={}", until)?;
        }
        if !self.by_day.is_empty() {
            write!(f, ";BYDAY={}", self.by_day.join(","))?;
        }
        if !self.by_month_day.is_empty() {
            write!(f, ";BYMONTHDAY={}", join_ints(&self.by_month_day))?;
        }
        if !self.by_month.is_empty() {
            write!(f, ";BYMONTH={}", join_ints(&self.by_month))?;
        }
        if !self.by_set_pos.is_empty() {
            write!(f, ";BYSETPOS={}", join_ints(&self.by_set_pos))?;
        }
        Ok(())
    }
}

fn join_ints<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
