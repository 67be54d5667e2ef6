//! Nearest-meter search around a destination.

use std::fmt;
use std::str::FromStr;

use jiff::civil::DateTime;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eval::Evaluation;
use crate::schedule::Schedule;
use crate::status::Status;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn distance_m(self, other: GeoPoint) -> f64 {
        haversine_m(self, other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Great-circle distance in meters.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let (phi1, phi2) = (a.lat.to_radians(), b.lat.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (b.lon - a.lon).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// A meter post (or a cluster standing in for several) and its schedule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Meter {
    pub post_id: String,
    pub location: GeoPoint,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub street_name: Option<String>,
    pub schedule: Schedule,
}

impl Meter {
    pub fn new(post_id: impl Into<String>, location: GeoPoint, schedule: Schedule) -> Self {
        Self {
            post_id: post_id.into(),
            location,
            street_name: None,
            schedule,
        }
    }

    pub fn with_street_name(mut self, street: impl Into<String>) -> Self {
        self.street_name = Some(street.into());
        self
    }

    pub fn evaluate(&self, at: DateTime) -> Evaluation<'_> {
        self.schedule.evaluate(at)
    }
}

/// Which statuses count as available in a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Availability {
    /// Every meter, whatever its status.
    Any,
    /// Anything a car may be left at: everything but tow-away.
    #[default]
    Parkable,
    /// Only meters that are free right now.
    #[cfg_attr(feature = "serde", serde(rename = "free"))]
    FreeOnly,
}

impl Availability {
    pub fn admits(self, status: Status) -> bool {
        match self {
            Self::Any => true,
            Self::Parkable => status.is_parkable(),
            Self::FreeOnly => status == Status::Free,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Parkable => "parkable",
            Self::FreeOnly => "free",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "parkable" => Ok(Self::Parkable),
            "free" => Ok(Self::FreeOnly),
            other => Err(format!(
                "unknown availability '{other}', expected any, parkable or free"
            )),
        }
    }
}

/// Search tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    pub max_distance_m: Option<f64>,
    pub availability: Availability,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            max_distance_m: None,
            availability: Availability::default(),
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Nearby<'a> {
    pub meter: &'a Meter,
    pub distance_m: f64,
    pub evaluation: Evaluation<'a>,
}

/// Meters nearest to `destination` whose status at `at` is admitted by the
/// options, closest first. Every meter is evaluated at the same instant.
/// Equal distances are ordered by post id.
pub fn nearest<'a>(
    meters: &'a [Meter],
    destination: GeoPoint,
    at: DateTime,
    options: &SearchOptions,
) -> Vec<Nearby<'a>> {
    let mut hits: Vec<Nearby<'a>> = meters
        .iter()
        .filter_map(|meter| {
            let distance_m = haversine_m(destination, meter.location);
            if options.max_distance_m.is_some_and(|max| distance_m > max) {
                return None;
            }
            let evaluation = meter.evaluate(at);
            options.availability.admits(evaluation.status).then_some(Nearby {
                meter,
                distance_m,
                evaluation,
            })
        })
        .collect();

    let matched = hits.len();
    hits.sort_by(|a, b| {
        a.distance_m
            .total_cmp(&b.distance_m)
            .then_with(|| a.meter.post_id.cmp(&b.meter.post_id))
    });
    hits.truncate(options.limit);

    debug!(
        meters = meters.len(),
        matched,
        returned = hits.len(),
        availability = %options.availability,
        "nearest meter search"
    );
    hits
}
