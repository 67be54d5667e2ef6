use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Day of the week, numbered from Sunday the way posted schedules are
/// evaluated (Sunday = 0 .. Saturday = 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Sunday = 0 .. Saturday = 6.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Weekday::index`], wrapping modulo 7.
    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 7) as usize]
    }

    /// The day `n` days after this one.
    pub fn plus(self, n: u8) -> Self {
        Self::from_index(self.index() + n % 7)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Two-letter abbreviation used in source schedules.
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Sunday => "Su",
            Self::Monday => "Mo",
            Self::Tuesday => "Tu",
            Self::Wednesday => "We",
            Self::Thursday => "Th",
            Self::Friday => "Fr",
            Self::Saturday => "Sa",
        }
    }

    /// Parse a two-letter abbreviation (`"Mo"`), exact case.
    pub fn from_abbrev(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.abbrev() == s)
    }

    pub fn from_jiff(wd: jiff::civil::Weekday) -> Self {
        use jiff::civil::Weekday as J;
        match wd {
            J::Sunday => Self::Sunday,
            J::Monday => Self::Monday,
            J::Tuesday => Self::Tuesday,
            J::Wednesday => Self::Wednesday,
            J::Thursday => Self::Thursday,
            J::Friday => Self::Friday,
            J::Saturday => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of weekdays a rule applies on, one bit per day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DaySet(u8);

impl DaySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.index();
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Days in the set, Sunday first.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        Weekday::ALL.into_iter().filter(move |d| self.contains(*d))
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = DaySet::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Source days order is Monday first (`"Mo,Tu,We"`), so render that way.
impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for day in (1..=7).map(Weekday::from_index) {
            if self.contains(day) {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(day.abbrev())?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Time of day (hours and minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    /// Returns `None` outside 00:00..=23:59.
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Minutes since midnight, in `0..1440`.
    pub fn minute_of_day(self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    pub fn from_jiff(time: jiff::civil::Time) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(feature = "serde")]
impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::record::parse_time(&s).map_err(serde::de::Error::custom)
    }
}

/// Enforcement classification of a posted rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterState {
    TowAway,
    Paid,
    Free,
    /// Text that matches none of the known states. Such rules never bind.
    Unrecognized,
}

impl MeterState {
    /// Classify free-form meter state text. Matching is case-insensitive on
    /// substrings, checked in order: tow-away, then paid/general metered,
    /// then free.
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        if lower.contains("tow-away") {
            Self::TowAway
        } else if lower.contains("paid") || lower.contains("general metered") {
            Self::Paid
        } else if lower.contains("free") {
            Self::Free
        } else {
            Self::Unrecognized
        }
    }
}

/// One posted weekly metering rule, with its window resolved to minutes and
/// its state classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRule {
    pub days: DaySet,
    pub from: TimeOfDay,
    pub to: TimeOfDay,
    /// `from_time` exactly as the source wrote it; used in messages.
    pub from_text: String,
    pub to_text: String,
    pub state: MeterState,
    pub raw_state: String,
    pub time_limit_min: Option<u32>,
}

impl WeeklyRule {
    pub fn applies_on(&self, day: Weekday) -> bool {
        self.days.contains(day)
    }

    /// Half-open: the rule stops binding at `to` exactly.
    pub fn is_active_at(&self, day: Weekday, minute: u16) -> bool {
        self.applies_on(day)
            && self.from.minute_of_day() <= minute
            && minute < self.to.minute_of_day()
    }

    pub fn starts_after(&self, minute: u16) -> bool {
        self.from.minute_of_day() > minute
    }

    /// `days|from|to|limit|state` with days Monday-first and times `HH:MM`.
    pub fn canonical_line(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.days,
            self.from,
            self.to,
            self.time_limit_min.map(|m| m.to_string()).unwrap_or_default(),
            self.raw_state.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_numbering_starts_on_sunday() {
        assert_eq!(Weekday::Sunday.index(), 0);
        assert_eq!(Weekday::Saturday.index(), 6);
        assert_eq!(Weekday::from_index(7), Weekday::Sunday);
        assert_eq!(Weekday::Friday.plus(3), Weekday::Monday);
        assert_eq!(Weekday::Friday.plus(7), Weekday::Friday);
    }

    #[test]
    fn weekday_from_jiff() {
        assert_eq!(
            Weekday::from_jiff(jiff::civil::Weekday::Sunday),
            Weekday::Sunday
        );
        assert_eq!(
            Weekday::from_jiff(jiff::civil::Weekday::Thursday),
            Weekday::Thursday
        );
    }

    #[test]
    fn day_set_membership_and_display() {
        let set: DaySet = [Weekday::Sunday, Weekday::Monday, Weekday::Friday]
            .into_iter()
            .collect();
        assert!(set.contains(Weekday::Monday));
        assert!(!set.contains(Weekday::Tuesday));
        assert_eq!(set.len(), 3);
        assert_eq!(set.to_string(), "Mo,Fr,Su");
        assert!(DaySet::empty().is_empty());
    }

    #[test]
    fn classify_meter_states() {
        assert_eq!(MeterState::classify("Tow-away"), MeterState::TowAway);
        assert_eq!(MeterState::classify("General Metered"), MeterState::Paid);
        assert_eq!(
            MeterState::classify("Commercial Loading (paid)"),
            MeterState::Paid
        );
        assert_eq!(MeterState::classify("FREE"), MeterState::Free);
        assert_eq!(
            MeterState::classify("Commercial Loading (metered)"),
            MeterState::Unrecognized
        );
        assert_eq!(MeterState::classify(""), MeterState::Unrecognized);
    }

    #[test]
    fn tow_away_wins_over_paid_in_same_text() {
        assert_eq!(
            MeterState::classify("Tow-away, paid after 10"),
            MeterState::TowAway
        );
    }

    #[test]
    fn time_of_day_bounds() {
        assert!(TimeOfDay::new(24, 0).is_none());
        assert!(TimeOfDay::new(23, 60).is_none());
        let t = TimeOfDay::new(9, 5).unwrap();
        assert_eq!(t.minute_of_day(), 545);
        assert_eq!(t.to_string(), "09:05");
    }
}
