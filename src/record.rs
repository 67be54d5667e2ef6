//! Source rule records and the conversions that turn them into [`WeeklyRule`]s.
//!
//! Records arrive with every field as text, the way the upstream schedule
//! export writes them: `days` as comma-joined abbreviations (`"Mo,Tu,We"`),
//! times as `HH:MM`. Twelve-hour times (`"7:00 AM"`) are accepted too since
//! unnormalized exports still carry them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result, Span};
use crate::rule::{DaySet, MeterState, TimeOfDay, WeeklyRule, Weekday};

/// One posted rule as it appears in source data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuleRecord {
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub days: String,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub from_time: String,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub to_time: String,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub meter_state: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_limit_min: Option<u32>,
}

#[cfg(feature = "serde")]
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RuleRecord {
    pub fn new(
        days: impl Into<String>,
        from_time: impl Into<String>,
        to_time: impl Into<String>,
        meter_state: impl Into<String>,
    ) -> Self {
        Self {
            days: days.into(),
            from_time: from_time.into(),
            to_time: to_time.into(),
            meter_state: meter_state.into(),
            time_limit_min: None,
        }
    }

    pub fn with_time_limit(mut self, minutes: u32) -> Self {
        self.time_limit_min = Some(minutes);
        self
    }
}

/// Parse a comma-separated day list into a [`DaySet`].
///
/// Each token is cut to its first two letters and title-cased, so `"Mo"`,
/// `"MON"` and `"monday"` all mean Monday. Tokens that name no day are
/// dropped; a list of only such tokens yields an empty set, and a rule with
/// an empty set never applies.
pub fn parse_days(input: &str) -> DaySet {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| Weekday::from_abbrev(&title_prefix(token)))
        .collect()
}

fn title_prefix(token: &str) -> String {
    let mut chars = token.chars();
    let mut out = String::with_capacity(2);
    if let Some(c) = chars.next() {
        out.extend(c.to_uppercase());
    }
    if let Some(c) = chars.next() {
        out.extend(c.to_lowercase());
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Parse a time of day: 24-hour `HH:MM` / `H:MM`, or 12-hour `H:MM AM`,
/// `H AM` (case-insensitive, space optional).
pub fn parse_time(input: &str) -> Result<TimeOfDay> {
    let offset = input.len() - input.trim_start().len();
    let s = input.trim();
    if s.is_empty() {
        return Err(Error::time(
            "expected a time like 09:00",
            Span::new(0, input.len()),
            input,
        ));
    }

    let (clock, meridiem) = split_meridiem(s);
    let (hour_text, minute_text) = match clock.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (clock, None),
    };

    let hour = parse_field(hour_text, offset, input, "hour")?;
    let minute = match minute_text {
        Some(m) => parse_field(m, offset + hour_text.len() + 1, input, "minute")?,
        None if meridiem.is_some() => 0,
        None => {
            return Err(Error::time(
                format!("missing minutes in '{s}'"),
                Span::new(offset, offset + s.len()),
                input,
            ))
        }
    };

    let hour_span = Span::new(offset, offset + hour_text.len());
    let hour = match meridiem {
        None if hour < 24 => hour,
        None => {
            return Err(Error::time(
                format!("hour {hour} is out of range"),
                hour_span,
                input,
            ))
        }
        Some(_) if !(1..=12).contains(&hour) => {
            return Err(Error::time(
                format!("hour {hour} is out of range for a 12-hour clock"),
                hour_span,
                input,
            ))
        }
        Some(Meridiem::Am) => hour % 12,
        Some(Meridiem::Pm) => hour % 12 + 12,
    };

    TimeOfDay::new(hour, minute).ok_or_else(|| {
        let start = offset + hour_text.len() + 1;
        let end = start + minute_text.map_or(0, str::len);
        Error::time(
            format!("minute {minute} is out of range"),
            Span::new(start, end),
            input,
        )
    })
}

fn split_meridiem(s: &str) -> (&str, Option<Meridiem>) {
    let lower = s.to_ascii_lowercase();
    for (suffix, meridiem) in [("am", Meridiem::Am), ("pm", Meridiem::Pm)] {
        if lower.ends_with(suffix) {
            return (s[..s.len() - suffix.len()].trim_end(), Some(meridiem));
        }
    }
    (s, None)
}

fn parse_field(text: &str, start: usize, input: &str, what: &str) -> Result<u8> {
    let span = Span::new(start, start + text.len());
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::time(format!("invalid {what} '{text}'"), span, input));
    }
    text.parse()
        .map_err(|_| Error::time(format!("invalid {what} '{text}'"), span, input))
}

impl WeeklyRule {
    /// Resolve a source record. Fails when either time is unreadable or the
    /// window is empty (`from_time` at or after `to_time`).
    pub fn from_record(record: &RuleRecord) -> Result<Self> {
        let from = parse_time(&record.from_time)?;
        let to = parse_time(&record.to_time)?;
        if from >= to {
            return Err(Error::rule(format!(
                "window {}-{} is empty or crosses midnight",
                record.from_time.trim(),
                record.to_time.trim()
            )));
        }
        Ok(Self {
            days: parse_days(&record.days),
            from,
            to,
            from_text: record.from_time.trim().to_string(),
            to_text: record.to_time.trim().to_string(),
            state: MeterState::classify(&record.meter_state),
            raw_state: record.meter_state.clone(),
            time_limit_min: record.time_limit_min,
        })
    }

    /// Back to source shape, with days in canonical Monday-first order.
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            days: self.days.to_string(),
            from_time: self.from_text.clone(),
            to_time: self.to_text.clone(),
            meter_state: self.raw_state.clone(),
            time_limit_min: self.time_limit_min,
        }
    }
}
