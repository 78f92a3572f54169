//! Rollup aggregators.
//!
//! Each aggregator is a pure function from a [`FilteredView`](crate::filter::FilteredView)
//! to a [`DerivedTable`](types::DerivedTable). None reads another's output, so
//! they can run in any order or in parallel over the same view.

pub mod monthly;
pub mod rfm;
pub mod season;
pub mod totals;
pub mod types;
pub mod utility;
pub mod weather;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::filter::{FilteredView, filter};
    use crate::records::{Month, RentalRecord, Season, WeatherCondition, parse_timestamp};
    use crate::store::{Granularity, RecordStore};
    use chrono::{Datelike, NaiveDate};

    pub(crate) fn record(
        id: u64,
        timestamp: &str,
        season: Season,
        weather: WeatherCondition,
        registered: u64,
        casual: u64,
    ) -> RentalRecord {
        let timestamp = parse_timestamp(timestamp).unwrap();
        RentalRecord {
            position: 0,
            record_id: id,
            timestamp,
            season,
            weather_condition: weather,
            month: Month::ALL[timestamp.month0() as usize],
            year: timestamp.year(),
            registered,
            casual,
            total_count: registered + casual,
        }
    }

    /// A view covering the whole store.
    pub(crate) fn full_view<G: Granularity>(records: Vec<RentalRecord>) -> FilteredView<G> {
        let store = RecordStore::<G>::from_records(records);
        filter(&store, NaiveDate::MIN, NaiveDate::MAX).unwrap()
    }
}
