//! Loading meters from JSON.
//!
//! The expected document is an array of meter records, each carrying its
//! own rule list:
//!
//! ```json
//! [
//!   {
//!     "post_id": "201-00010",
//!     "latitude": 37.7749,
//!     "longitude": -122.4194,
//!     "street_name": "MARKET ST",
//!     "schedule": [
//!       {"days": "Mo,Tu,We,Th,Fr", "from_time": "09:00", "to_time": "18:00",
//!        "meter_state": "General Metered", "time_limit_min": 120}
//!     ]
//!   }
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::locate::{GeoPoint, Meter};
use crate::record::RuleRecord;
use crate::schedule::Schedule;

/// One meter as it appears in a meter file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterRecord {
    pub post_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    #[serde(default)]
    pub schedule: Option<Vec<RuleRecord>>,
}

impl MeterRecord {
    /// `None` when the coordinates are not finite numbers.
    pub fn into_meter(self) -> Option<Meter> {
        let location = GeoPoint::new(self.latitude, self.longitude);
        if !location.is_finite() {
            return None;
        }
        let schedule = Schedule::from_records(self.schedule.as_deref().unwrap_or_default());
        if schedule.skipped() > 0 {
            debug!(
                post_id = %self.post_id,
                skipped = schedule.skipped(),
                "meter has rules with unusable windows"
            );
        }
        Some(Meter {
            post_id: self.post_id,
            location,
            street_name: self.street_name.filter(|s| !s.trim().is_empty()),
            schedule,
        })
    }
}

/// Parse meters from a JSON document. Records without usable coordinates
/// are skipped.
pub fn meters_from_str(json: &str) -> Result<Vec<Meter>> {
    let records: Vec<MeterRecord> = serde_json::from_str(json)?;
    let total = records.len();
    let meters: Vec<Meter> = records
        .into_iter()
        .filter_map(|record| {
            let post_id = record.post_id.clone();
            let meter = record.into_meter();
            if meter.is_none() {
                warn!(%post_id, "skipping meter without usable coordinates");
            }
            meter
        })
        .collect();
    debug!(total, loaded = meters.len(), "loaded meters");
    Ok(meters)
}

/// Read and parse a meter file.
pub fn load_meters(path: impl AsRef<Path>) -> Result<Vec<Meter>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = json.len(), "read meter file");
    meters_from_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const DOC: &str = r#"[
        {"post_id": "A", "latitude": 37.7749, "longitude": -122.4194,
         "street_name": "MARKET ST",
         "schedule": [
            {"days": "Mo,Tu", "from_time": "09:00", "to_time": "18:00",
             "meter_state": "General Metered", "time_limit_min": 120},
            {"days": "Mo", "from_time": null, "to_time": null,
             "meter_state": "Paid", "time_limit_min": null}
         ]},
        {"post_id": "B", "latitude": 37.7750, "longitude": -122.4195},
        {"post_id": "C", "latitude": 37.7751, "longitude": -122.4196, "schedule": null}
    ]"#;

    #[test]
    fn loads_meters_and_schedules() {
        let meters = meters_from_str(DOC).unwrap();
        assert_eq!(meters.len(), 3);
        assert_eq!(meters[0].street_name.as_deref(), Some("MARKET ST"));
        assert_eq!(meters[0].schedule.rule_count(), 1);
        assert_eq!(meters[0].schedule.skipped(), 1);
        assert!(meters[1].schedule.is_unposted());
        assert!(meters[2].schedule.is_unposted());
    }

    #[test]
    fn non_finite_coordinates_are_skipped() {
        let record = MeterRecord {
            post_id: "X".into(),
            latitude: f64::NAN,
            longitude: 0.0,
            street_name: None,
            schedule: None,
        };
        assert!(record.into_meter().is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = meters_from_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_meters("/nonexistent/meters.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
