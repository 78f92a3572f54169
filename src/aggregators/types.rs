//! Row types produced by the aggregators.

use crate::records::{Month, Season, WeatherCondition};
use chrono::NaiveDate;
use serde::Serialize;

/// An ordered, named sequence of rows. Row order is defined by each aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTable<R> {
    pub name: &'static str,
    pub rows: Vec<R>,
}

impl<R> DerivedTable<R> {
    pub fn new(name: &'static str, rows: Vec<R>) -> Self {
        Self { name, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Registered rentals per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredTotal {
    pub datetime: NaiveDate,
    pub register_sum: u64,
}

/// Casual rentals per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CasualTotal {
    pub datetime: NaiveDate,
    pub casual_sum: u64,
}

/// A day inside the headline reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub datetime: NaiveDate,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherTotal {
    pub weather_condition: WeatherCondition,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonTotal {
    pub season: Season,
    pub total_count: u64,
}

/// Registered and casual rentals per season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonSplit {
    pub season: Season,
    pub registered: u64,
    pub casual: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrend {
    pub year: i32,
    pub month: Month,
    pub total_count: u64,
}

/// Recency, frequency and monetary figures for one `registered` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfmRow {
    pub registered: u64,
    /// Days between the dataset's latest date and this group's latest date.
    pub recency: i64,
    pub frequency: u64,
    pub monetary: u64,
}

/// Top-N RFM rows by each measure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfmLeaderboards {
    pub by_recency: Vec<RfmRow>,
    pub by_frequency: Vec<RfmRow>,
    pub by_monetary: Vec<RfmRow>,
}

/// Headline metrics shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_rentals: u64,
    pub total_registered: u64,
    pub total_casual: u64,
}
