//! Record shapes shared by the daily and hourly datasets.
//!
//! `season`, `weather_condition` and `month` are parsed into closed variants
//! here so nothing downstream compares free-form strings.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Column names every input must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "datetime",
    "season",
    "weather_condition",
    "month",
    "year",
    "registered",
    "casual",
    "total_count",
];

/// Season of the year. Codes outside the four seasons are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    Other(String),
}

impl Season {
    /// Accepts season names (case-insensitive) and the numeric codes 1-4.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "spring" | "1" => Season::Spring,
            "summer" | "2" => Season::Summer,
            "fall" | "autumn" | "3" => Season::Fall,
            "winter" | "4" => Season::Winter,
            _ => Season::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
            Season::Other(code) => code,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Season::Other(_))
    }
}

/// Weather situation reported for a day or hour.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeatherCondition {
    Clear,
    Misty,
    LightPrecipitation,
    Severe,
    Other(String),
}

impl WeatherCondition {
    /// Accepts the canonical labels (case-insensitive) and the numeric codes 1-4.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "1" | "clear" | "clear/partly cloudy" => WeatherCondition::Clear,
            "2" | "misty" | "mist" | "misty/cloudy" => WeatherCondition::Misty,
            "3" | "light snow/rain" | "light rain/snow" | "light snow" | "light rain" => {
                WeatherCondition::LightPrecipitation
            }
            "4" | "severe weather" | "severe" | "heavy rain/snow" => WeatherCondition::Severe,
            _ => WeatherCondition::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            WeatherCondition::Clear => "Clear/Partly Cloudy",
            WeatherCondition::Misty => "Misty/Cloudy",
            WeatherCondition::LightPrecipitation => "Light Snow/Rain",
            WeatherCondition::Severe => "Severe Weather",
            WeatherCondition::Other(code) => code,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WeatherCondition::Other(_))
    }
}

/// Calendar month. Variant order is the chart order, Jan through Dec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Accepts abbreviations, full names (case-insensitive) and numbers 1-12.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if let Ok(n) = normalized.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Self::ALL.get(i)).copied();
        }
        Self::ALL.iter().copied().find(|m| {
            let abbrev = m.label().to_ascii_lowercase();
            normalized == abbrev || normalized == m.full_name().to_ascii_lowercase()
        })
    }

    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    fn full_name(self) -> &'static str {
        match self {
            Month::Jan => "January",
            Month::Feb => "February",
            Month::Mar => "March",
            Month::Apr => "April",
            Month::May => "May",
            Month::Jun => "June",
            Month::Jul => "July",
            Month::Aug => "August",
            Month::Sep => "September",
            Month::Oct => "October",
            Month::Nov => "November",
            Month::Dec => "December",
        }
    }
}

macro_rules! label_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

label_serde!(Season);
label_serde!(WeatherCondition);
label_serde!(Month);

/// A single normalized rental row, daily or hourly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentalRecord {
    /// Index within the store after sorting by timestamp.
    pub position: usize,
    pub record_id: u64,
    pub timestamp: NaiveDateTime,
    pub season: Season,
    pub weather_condition: WeatherCondition,
    pub month: Month,
    pub year: i32,
    pub registered: u64,
    pub casual: u64,
    pub total_count: u64,
}

impl RentalRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A row as it appears in the input CSV, before coercion of categorical fields.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRecord {
    pub(crate) datetime: String,
    pub(crate) season: String,
    pub(crate) weather_condition: String,
    pub(crate) month: String,
    pub(crate) year: i32,
    pub(crate) registered: u64,
    pub(crate) casual: u64,
    pub(crate) total_count: u64,
    #[serde(default)]
    pub(crate) rec_id: Option<u64>,
    #[serde(default, alias = "hours", alias = "hr")]
    pub(crate) hour: Option<u32>,
}

/// Parses `YYYY-MM-DD` or a date with a time of day separated by a space or `T`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}
