use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Enforcement status of a meter at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Status {
    Paid,
    Free,
    TowAway,
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Free => "FREE",
            Self::TowAway => "TOW_AWAY",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Marker appearance for map layers and status badges.
    pub fn marker(self) -> MarkerStyle {
        match self {
            Self::Paid => MarkerStyle {
                color: "red",
                glyph: "P",
                label: "Paid",
            },
            Self::Free => MarkerStyle {
                color: "green",
                glyph: "\u{2713}",
                label: "Free",
            },
            Self::TowAway => MarkerStyle {
                color: "orange",
                glyph: "T",
                label: "Tow-away",
            },
            Self::Unknown => MarkerStyle {
                color: "gray",
                glyph: "?",
                label: "Unknown",
            },
        }
    }

    /// Whether a car may be left here now (anything but tow-away).
    pub fn is_parkable(self) -> bool {
        !matches!(self, Self::TowAway)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed rendering attributes for a [`Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MarkerStyle {
    pub color: &'static str,
    pub glyph: &'static str,
    pub label: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_table() {
        assert_eq!(Status::Paid.marker().color, "red");
        assert_eq!(Status::Paid.marker().glyph, "P");
        assert_eq!(Status::Free.marker().color, "green");
        assert_eq!(Status::Free.marker().glyph, "✓");
        assert_eq!(Status::TowAway.marker().color, "orange");
        assert_eq!(Status::TowAway.marker().glyph, "T");
        assert_eq!(Status::Unknown.marker().color, "gray");
        assert_eq!(Status::Unknown.marker().glyph, "?");
    }

    #[test]
    fn wire_names() {
        assert_eq!(Status::TowAway.to_string(), "TOW_AWAY");
        assert_eq!(Status::Unknown.as_str(), "UNKNOWN");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&Status::TowAway).unwrap(),
            "\"TOW_AWAY\""
        );
        let status: Status = serde_json::from_str("\"PAID\"").unwrap();
        assert_eq!(status, Status::Paid);
    }
}
