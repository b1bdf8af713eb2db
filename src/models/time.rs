use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Granularity of the booking grid, in minutes.
pub const SLOT_MINUTES: u16 = 30;

/// Error for malformed or off-grid times.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid slot time: {0}")]
pub struct InvalidSlotTime(pub String);

/// Error for weekday numbers outside Monday(1)..Saturday(6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("weekday out of range (expected 1-6, Monday-Saturday): {0}")]
pub struct InvalidWeekday(pub u8);

/// Wall-clock time-of-day on the 30-minute booking grid.
///
/// Internally minutes since midnight. Only grid-aligned values between
/// 00:00 and 23:30 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u16);

impl SlotTime {
    /// Create a slot from hour and minute. The minute must fall on the grid.
    pub fn new(hour: u8, minute: u8) -> Result<Self, InvalidSlotTime> {
        if hour > 23 {
            return Err(InvalidSlotTime(format!("hour {} out of range", hour)));
        }
        if minute as u16 % SLOT_MINUTES != 0 || minute > 59 {
            return Err(InvalidSlotTime(format!(
                "minute {} is not on the {}-minute grid",
                minute, SLOT_MINUTES
            )));
        }
        Ok(Self(hour as u16 * 60 + minute as u16))
    }

    /// Create a slot from raw minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self, InvalidSlotTime> {
        if minutes >= 24 * 60 || minutes % SLOT_MINUTES != 0 {
            return Err(InvalidSlotTime(format!(
                "{} minutes is not a valid grid time",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.0 % 60) as u8
    }

    /// Every grid tick from `start` to `end`, both inclusive.
    ///
    /// Returns an empty vector when `start > end`.
    pub fn span(start: SlotTime, end: SlotTime) -> Vec<SlotTime> {
        (start.0..=end.0)
            .step_by(SLOT_MINUTES as usize)
            .map(SlotTime)
            .collect()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for SlotTime {
    type Err = InvalidSlotTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| InvalidSlotTime(format!("expected HH:MM, got {:?}", s)))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| InvalidSlotTime(format!("bad hour in {:?}", s)))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| InvalidSlotTime(format!("bad minute in {:?}", s)))?;
        SlotTime::new(hour, minute)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Working weekday, Monday(1) through Saturday(6).
///
/// Sunday is globally non-working and deliberately unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// ISO-style number, Monday = 1 .. Saturday = 6.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Weekday of a calendar date; `None` for Sundays.
    pub fn from_date(date: NaiveDate) -> Option<Weekday> {
        Weekday::try_from(date.weekday().number_from_monday() as u8).ok()
    }
}

impl From<Weekday> for u8 {
    fn from(w: Weekday) -> u8 {
        w.number()
    }
}

impl TryFrom<u8> for Weekday {
    type Error = InvalidWeekday;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Weekday::Monday),
            2 => Ok(Weekday::Tuesday),
            3 => Ok(Weekday::Wednesday),
            4 => Ok(Weekday::Thursday),
            5 => Ok(Weekday::Friday),
            6 => Ok(Weekday::Saturday),
            other => Err(InvalidWeekday(other)),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u8, m: u8) -> SlotTime {
        SlotTime::new(h, m).unwrap()
    }

    #[test]
    fn test_slot_new_rejects_off_grid() {
        assert!(SlotTime::new(9, 15).is_err());
        assert!(SlotTime::new(24, 0).is_err());
        assert!(SlotTime::new(9, 0).is_ok());
        assert!(SlotTime::new(23, 30).is_ok());
    }

    #[test]
    fn test_slot_parse_and_display() {
        let slot: SlotTime = "09:30".parse().unwrap();
        assert_eq!(slot, t(9, 30));
        assert_eq!(slot.to_string(), "09:30");
        assert!("9h30".parse::<SlotTime>().is_err());
        assert!("09:15".parse::<SlotTime>().is_err());
    }

    #[test]
    fn test_slot_ordering() {
        assert!(t(9, 0) < t(9, 30));
        assert!(t(13, 0) > t(10, 30));
    }

    #[test]
    fn test_slot_span_inclusive() {
        let span = SlotTime::span(t(9, 0), t(10, 30));
        assert_eq!(span, vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30)]);
    }

    #[test]
    fn test_slot_span_empty_when_reversed() {
        assert!(SlotTime::span(t(10, 0), t(9, 0)).is_empty());
    }

    #[test]
    fn test_slot_serde_as_string() {
        let json = serde_json::to_string(&t(18, 0)).unwrap();
        assert_eq!(json, "\"18:00\"");
        let back: SlotTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t(18, 0));
    }

    #[test]
    fn test_weekday_try_from() {
        assert_eq!(Weekday::try_from(1).unwrap(), Weekday::Monday);
        assert_eq!(Weekday::try_from(6).unwrap(), Weekday::Saturday);
        assert!(Weekday::try_from(0).is_err());
        assert!(Weekday::try_from(7).is_err());
    }

    #[test]
    fn test_weekday_from_date_excludes_sunday() {
        // 2026-08-09 is a Sunday, 2026-08-10 a Monday
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        assert_eq!(Weekday::from_date(sunday), None);
        assert_eq!(Weekday::from_date(monday), Some(Weekday::Monday));
    }

    #[test]
    fn test_weekday_serde_as_number() {
        let json = serde_json::to_string(&Weekday::Saturday).unwrap();
        assert_eq!(json, "6");
        let back: Weekday = serde_json::from_str("2").unwrap();
        assert_eq!(back, Weekday::Tuesday);
        assert!(serde_json::from_str::<Weekday>("7").is_err());
    }
}
