//! Per-user locale settings: first day of the week and day rollover time.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Weekday};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// ISO weekday number the calendar grid starts on (1 = Monday .. 7 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekStart(u8);

impl WeekStart {
    pub const MONDAY: WeekStart = WeekStart(1);
    pub const SUNDAY: WeekStart = WeekStart(7);

    pub fn new(iso: i64) -> Result<Self, ValidationError> {
        if (1..=7).contains(&iso) {
            Ok(WeekStart(iso as u8))
        } else {
            Err(ValidationError::InvalidWeekStart(iso))
        }
    }

    pub fn iso(&self) -> u32 {
        u32::from(self.0)
    }

    pub fn weekday(&self) -> Weekday {
        match self.0 {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    /// The seven weekdays in grid column order.
    pub fn columns(&self) -> [Weekday; 7] {
        let mut day = self.weekday();
        let mut out = [day; 7];
        for slot in out.iter_mut().skip(1) {
            day = day.succ();
            *slot = day;
        }
        out
    }

    fn from_name(name: &str) -> Option<Self> {
        let weekday: Weekday = name.trim().parse().ok()?;
        Some(WeekStart(weekday.number_from_monday() as u8))
    }
}

impl Default for WeekStart {
    fn default() -> Self {
        WeekStart::MONDAY
    }
}

impl From<Weekday> for WeekStart {
    fn from(day: Weekday) -> Self {
        WeekStart(day.number_from_monday() as u8)
    }
}

impl FromStr for WeekStart {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(n) => WeekStart::new(n),
            Err(_) => WeekStart::from_name(s)
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: "start_of_week".into(),
                    message: format!("'{s}' is neither 1..7 nor a weekday name"),
                }),
        }
    }
}

impl Serialize for WeekStart {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for WeekStart {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        // The server column defaults to the string "monday".
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Name(String),
        }

        match Raw::deserialize(d)? {
            Raw::Number(n) => WeekStart::new(n).map_err(de::Error::custom),
            Raw::Name(name) => name.parse().map_err(de::Error::custom),
        }
    }
}

/// Offset from midnight at which the user's day begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloverTime {
    minutes: u32,
}

impl RolloverTime {
    pub const MIDNIGHT: RolloverTime = RolloverTime { minutes: 0 };

    /// Accepts `00:00` through `24:00`; a full-day rollover keeps
    /// yesterday as today around the clock.
    pub fn from_hm(hours: u32, minutes: u32) -> Result<Self, ValidationError> {
        if hours > 24 || minutes > 59 || (hours == 24 && minutes > 0) {
            return Err(ValidationError::InvalidRolloverTime(format!(
                "{hours:02}:{minutes:02}"
            )));
        }
        Ok(Self {
            minutes: hours * 60 + minutes,
        })
    }

    pub fn as_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }

    pub fn hours(&self) -> u32 {
        self.minutes / 60
    }

    pub fn minutes(&self) -> u32 {
        self.minutes % 60
    }
}

impl fmt::Display for RolloverTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

impl FromStr for RolloverTime {
    type Err = ValidationError;

    /// Accepts `HH:MM`, and `HH:MM:SS` with the seconds ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidRolloverTime(s.to_string());
        let mut parts = s.trim().split(':');
        let (Some(h), Some(m)) = (parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if h.len() != 2 || m.len() != 2 {
            return Err(invalid());
        }
        if let Some(sec) = parts.next() {
            if sec.len() != 2 || sec.parse::<u32>().map_or(true, |v| v > 59) {
                return Err(invalid());
            }
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        let hours = h.parse::<u32>().map_err(|_| invalid())?;
        let minutes = m.parse::<u32>().map_err(|_| invalid())?;
        Self::from_hm(hours, minutes).map_err(|_| invalid())
    }
}

impl Serialize for RolloverTime {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RolloverTime {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Response of `GET /api/me`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleSettings {
    #[serde(default)]
    pub start_of_week: WeekStart,
    #[serde(default)]
    pub rollover_time: RolloverTime,
}

/// Body of `PATCH /api/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocaleSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_of_week: Option<WeekStart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollover_time: Option<RolloverTime>,
}

impl LocaleSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.start_of_week.is_none() && self.rollover_time.is_none()
    }
}
