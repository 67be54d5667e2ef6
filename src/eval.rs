use std::fmt;

use jiff::civil::DateTime;
#[cfg(feature = "serde")]
use serde::Serialize;
use tracing::trace;

use crate::record::RuleRecord;
use crate::rule::{MeterState, TimeOfDay, WeeklyRule, Weekday};
use crate::schedule::Schedule;
use crate::status::Status;

pub const NO_SCHEDULE_MESSAGE: &str = "No schedule data available";
pub const FREE_MESSAGE: &str = "Free parking";

/// When the status is next expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NextChange {
    /// 0 for later today, 1 for tomorrow, up to 7 for the same weekday next week.
    pub days_ahead: u8,
    pub weekday: Weekday,
    pub at: TimeOfDay,
}

/// Outcome of evaluating a schedule at one instant. Borrows the binding rule
/// from the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation<'a> {
    pub status: Status,
    pub message: String,
    /// The rule that produced a paid or tow-away status.
    pub rule: Option<&'a WeeklyRule>,
    pub next_change: Option<NextChange>,
}

impl<'a> Evaluation<'a> {
    fn unknown() -> Self {
        Self {
            status: Status::Unknown,
            message: NO_SCHEDULE_MESSAGE.to_string(),
            rule: None,
            next_change: None,
        }
    }

    /// Detach from the schedule for serialization or storage.
    pub fn to_report(&self) -> Report {
        Report {
            status: self.status,
            message: self.message.clone(),
            rule: self.rule.map(WeeklyRule::to_record),
            next_change: self.next_change,
        }
    }
}

impl fmt::Display for Evaluation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

/// Owned, serializable form of an [`Evaluation`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Report {
    pub status: Status,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub rule: Option<RuleRecord>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub next_change: Option<NextChange>,
}

/// Evaluate `schedule` at the wall-clock instant `at`.
///
/// The first rule in priority order whose window contains `at` decides the
/// status; rules with unrecognized state text are passed over. With no
/// binding rule the meter is free, and the message names when the next
/// rule starts.
pub fn evaluate(schedule: &Schedule, at: DateTime) -> Evaluation<'_> {
    if schedule.is_unposted() {
        return Evaluation::unknown();
    }

    let day = Weekday::from_jiff(at.weekday());
    let minute = TimeOfDay::from_jiff(at.time()).minute_of_day();

    active(schedule, day, minute).unwrap_or_else(|| lookahead(schedule, day, minute))
}

fn active(schedule: &Schedule, day: Weekday, minute: u16) -> Option<Evaluation<'_>> {
    for rule in schedule.by_priority().filter(|r| r.is_active_at(day, minute)) {
        let (status, message, binding) = match rule.state {
            MeterState::TowAway => (
                Status::TowAway,
                format!("Tow-away zone until {}", rule.to_text),
                Some(rule),
            ),
            MeterState::Paid => (Status::Paid, paid_message(rule), Some(rule)),
            MeterState::Free => (
                Status::Free,
                format!("Free until {}", rule.to_text),
                None,
            ),
            MeterState::Unrecognized => {
                trace!(state = %rule.raw_state, "passing over unrecognized active rule");
                continue;
            }
        };
        return Some(Evaluation {
            status,
            message,
            rule: binding,
            next_change: Some(NextChange {
                days_ahead: 0,
                weekday: day,
                at: rule.to,
            }),
        });
    }
    None
}

fn paid_message(rule: &WeeklyRule) -> String {
    match rule.time_limit_min {
        Some(limit) => format!("Paid parking until {}, {limit} min limit", rule.to_text),
        None => format!("Paid parking until {}", rule.to_text),
    }
}

fn lookahead(schedule: &Schedule, day: Weekday, minute: u16) -> Evaluation<'_> {
    let next = later_today(schedule, day, minute)
        .map(|rule| (0, rule))
        .or_else(|| next_day_with_rules(schedule, day));

    let Some((days_ahead, rule)) = next else {
        return Evaluation {
            status: Status::Free,
            message: FREE_MESSAGE.to_string(),
            rule: None,
            next_change: None,
        };
    };

    let weekday = day.plus(days_ahead);
    let message = match days_ahead {
        0 => format!("Free until {}", rule.from_text),
        1 => format!("Free until Tomorrow at {}", rule.from_text),
        _ => format!("Free until {} at {}", weekday.name(), rule.from_text),
    };
    Evaluation {
        status: Status::Free,
        message,
        rule: None,
        next_change: Some(NextChange {
            days_ahead,
            weekday,
            at: rule.from,
        }),
    }
}

/// Earliest rule on `day` that starts after `minute`.
fn later_today(schedule: &Schedule, day: Weekday, minute: u16) -> Option<&WeeklyRule> {
    schedule
        .by_priority()
        .find(|r| r.applies_on(day) && r.starts_after(minute))
}

/// First following day, up to a full week out, with any rule at all; the
/// rule reported is that day's first in source order.
fn next_day_with_rules(schedule: &Schedule, day: Weekday) -> Option<(u8, &WeeklyRule)> {
    (1..=7).find_map(|offset| {
        let target = day.plus(offset);
        schedule
            .rules()
            .iter()
            .find(|r| r.applies_on(target))
            .map(|rule| (offset, rule))
    })
}
