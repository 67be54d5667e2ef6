//! meterwise — is this parking spot free right now, and until when?
//!
//! Evaluates posted weekly parking meter schedules against a wall-clock
//! instant, finds the nearest meters a car can be left at, and groups
//! neighbouring meters that share a schedule.
//!
//! # Examples
//!
//! ```
//! use meterwise::{RuleRecord, Schedule, Status};
//!
//! let schedule = Schedule::from_records(&[
//!     RuleRecord::new("Mo,Tu,We,Th,Fr", "09:00", "18:00", "General Metered"),
//! ]);
//!
//! // 2026-02-09 is a Monday.
//! let at = jiff::civil::date(2026, 2, 9).at(7, 30, 0, 0);
//! let result = schedule.evaluate(at);
//! assert_eq!(result.status, Status::Free);
//! assert_eq!(result.message, "Free until 09:00");
//! ```

pub mod cluster;
pub mod error;
pub mod eval;
#[cfg(feature = "serde")]
pub mod load;
pub mod locate;
pub mod record;
pub mod rule;
pub mod schedule;
pub mod status;

pub use error::{Error, Result};
pub use eval::{Evaluation, NextChange, Report};
pub use locate::{Availability, GeoPoint, Meter, Nearby, SearchOptions};
pub use record::RuleRecord;
pub use rule::{DaySet, MeterState, TimeOfDay, WeeklyRule, Weekday};
pub use schedule::Schedule;
pub use status::{MarkerStyle, Status};

use jiff::civil::DateTime;
use jiff::Zoned;
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// --- Schedule convenience methods ---

impl Schedule {
    /// Evaluate at a wall-clock date and time.
    pub fn evaluate(&self, at: DateTime) -> Evaluation<'_> {
        eval::evaluate(self, at)
    }

    /// Evaluate at the local wall-clock reading of a zoned instant.
    pub fn evaluate_zoned(&self, at: &Zoned) -> Evaluation<'_> {
        eval::evaluate(self, at.datetime())
    }

    /// Evaluate against the system clock in the system time zone.
    pub fn evaluate_now(&self) -> Evaluation<'_> {
        self.evaluate_zoned(&Zoned::now())
    }
}

#[cfg(feature = "serde")]
impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_records().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        // Absent or null means no posted rules.
        let records = Option::<Vec<RuleRecord>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(Schedule::from_records(&records))
    }
}
