//! Record Store: parses the daily and hourly datasets into immutable,
//! timestamp-sorted stores.

use crate::error::{Result, RollupError};
use crate::records::{
    Month, REQUIRED_COLUMNS, RawRecord, RentalRecord, Season, WeatherCondition, parse_timestamp,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use flate2::read::MultiGzDecoder;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Time resolution of a dataset. Decides how raw timestamps are normalized.
pub trait Granularity: Send + Sync + 'static {
    const NAME: &'static str;

    /// Returns `None` when the optional hour column is out of range.
    fn normalize(timestamp: NaiveDateTime, hour: Option<u32>) -> Option<NaiveDateTime>;
}

/// One row per calendar day.
#[derive(Debug, Clone, Copy)]
pub struct Daily;

/// One row per hour.
#[derive(Debug, Clone, Copy)]
pub struct Hourly;

impl Granularity for Daily {
    const NAME: &'static str = "daily";

    fn normalize(timestamp: NaiveDateTime, _hour: Option<u32>) -> Option<NaiveDateTime> {
        Some(timestamp.date().and_time(NaiveTime::MIN))
    }
}

impl Granularity for Hourly {
    const NAME: &'static str = "hourly";

    fn normalize(timestamp: NaiveDateTime, hour: Option<u32>) -> Option<NaiveDateTime> {
        match hour {
            // A separate hour column only applies to date-only timestamps.
            Some(h) if timestamp.time() == NaiveTime::MIN => {
                (h < 24).then(|| timestamp + TimeDelta::hours(h as i64))
            }
            _ => Some(timestamp),
        }
    }
}

/// Immutable dataset sorted ascending by timestamp.
///
/// Cloning is cheap: the record buffer is shared.
#[derive(Debug, Clone)]
pub struct RecordStore<G> {
    records: Arc<[RentalRecord]>,
    _granularity: PhantomData<G>,
}

pub type DailyStore = RecordStore<Daily>;
pub type HourlyStore = RecordStore<Hourly>;

/// Parses both datasets. Fails on the first malformed row of either input.
pub fn load<D: Read, H: Read>(raw_daily: D, raw_hourly: H) -> Result<(DailyStore, HourlyStore)> {
    let daily = DailyStore::from_reader(raw_daily)?;
    let hourly = HourlyStore::from_reader(raw_hourly)?;
    Ok((daily, hourly))
}

/// Like [`load`], reading from paths. Files ending in `.gz` are decompressed.
pub fn load_paths(
    daily_path: impl AsRef<Path>,
    hourly_path: impl AsRef<Path>,
) -> Result<(DailyStore, HourlyStore)> {
    let daily = DailyStore::from_path(daily_path)?;
    let hourly = HourlyStore::from_path(hourly_path)?;
    Ok((daily, hourly))
}

impl<G: Granularity> RecordStore<G> {
    /// Builds a store from already-coerced records: stable-sorts by timestamp
    /// and reassigns positions.
    pub fn from_records(mut records: Vec<RentalRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        for (position, record) in records.iter_mut().enumerate() {
            record.position = position;
        }
        Self {
            records: records.into(),
            _granularity: PhantomData,
        }
    }

    #[tracing::instrument(skip_all, fields(dataset = G::NAME, path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufReader::new(File::open(path)?);
        if path.extension().and_then(|e| e.to_str()) == Some("gz") {
            debug!("Decompressing gzip input");
            Self::from_reader(MultiGzDecoder::new(file))
        } else {
            Self::from_reader(file)
        }
    }

    /// Parses CSV input with a header row. Extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(RollupError::malformed(
                    G::NAME,
                    0,
                    format!("missing required column `{}`", column),
                ));
            }
        }

        let mut records = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut unknown_codes: BTreeMap<String, usize> = BTreeMap::new();

        for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
            let row = idx as u64 + 1;
            let raw = result.map_err(|e| RollupError::malformed(G::NAME, row, e.to_string()))?;
            let record = coerce::<G>(raw, row)?;

            if !seen_ids.insert(record.record_id) {
                return Err(RollupError::malformed(
                    G::NAME,
                    row,
                    format!("duplicate record id {}", record.record_id),
                ));
            }
            if !record.season.is_known() {
                *unknown_codes
                    .entry(format!("season={}", record.season))
                    .or_default() += 1;
            }
            if !record.weather_condition.is_known() {
                *unknown_codes
                    .entry(format!("weather_condition={}", record.weather_condition))
                    .or_default() += 1;
            }

            records.push(record);
        }

        for (code, count) in &unknown_codes {
            warn!(dataset = G::NAME, code = %code, count, "Unrecognized category code");
        }

        let store = Self::from_records(records);
        info!(dataset = G::NAME, records = store.len(), "Record store loaded");
        Ok(store)
    }

    pub fn records(&self) -> &[RentalRecord] {
        &self.records
    }

    pub(crate) fn shared(&self) -> Arc<[RentalRecord]> {
        Arc::clone(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest timestamp in the store.
    pub fn latest(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.timestamp)
    }

    /// First and last calendar dates present, the limits a date picker should offer.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?;
        let last = self.records.last()?;
        Some((first.date(), last.date()))
    }
}

fn coerce<G: Granularity>(raw: RawRecord, row: u64) -> Result<RentalRecord> {
    let parsed = parse_timestamp(&raw.datetime).ok_or_else(|| {
        RollupError::malformed(G::NAME, row, format!("invalid datetime `{}`", raw.datetime))
    })?;
    let timestamp = G::normalize(parsed, raw.hour).ok_or_else(|| {
        RollupError::malformed(G::NAME, row, format!("invalid hour {:?}", raw.hour))
    })?;
    let month = Month::parse(&raw.month).ok_or_else(|| {
        RollupError::malformed(G::NAME, row, format!("invalid month `{}`", raw.month))
    })?;

    if raw.registered.checked_add(raw.casual) != Some(raw.total_count) {
        return Err(RollupError::malformed(
            G::NAME,
            row,
            format!(
                "total_count {} does not equal registered {} + casual {}",
                raw.total_count, raw.registered, raw.casual
            ),
        ));
    }

    Ok(RentalRecord {
        position: 0,
        record_id: raw.rec_id.unwrap_or(row),
        timestamp,
        season: Season::parse(&raw.season),
        weather_condition: WeatherCondition::parse(&raw.weather_condition),
        month,
        year: raw.year,
        registered: raw.registered,
        casual: raw.casual,
        total_count: raw.total_count,
    })
}
