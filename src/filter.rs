//! Range Filter: restricts a store to an inclusive calendar-date interval.

use crate::error::{Result, RollupError};
use crate::records::RentalRecord;
use crate::store::{Granularity, RecordStore};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

/// Inclusive date interval. Construction rejects `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RollupError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A non-owning, contiguous window over a [`RecordStore`].
///
/// Shares the store's buffer, so views are cheap to clone and can be moved
/// onto worker threads.
#[derive(Debug, Clone)]
pub struct FilteredView<G> {
    records: Arc<[RentalRecord]>,
    span: Range<usize>,
    range: DateRange,
    store_latest: Option<NaiveDateTime>,
    _granularity: PhantomData<G>,
}

impl<G: Granularity> FilteredView<G> {
    /// Records in store order.
    pub fn records(&self) -> &[RentalRecord] {
        &self.records[self.span.clone()]
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Latest timestamp of the whole store the view was cut from, regardless of range.
    pub fn store_latest(&self) -> Option<NaiveDateTime> {
        self.store_latest
    }
}

/// Returns every record with `start <= date(timestamp) <= end`, in store order.
///
/// Bounds outside the store are allowed and simply match nothing beyond it.
pub fn filter<G: Granularity>(
    store: &RecordStore<G>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<FilteredView<G>> {
    let range = DateRange::new(start, end)?;
    Ok(filter_range(store, range))
}

/// [`filter`] over an already validated range.
pub fn filter_range<G: Granularity>(store: &RecordStore<G>, range: DateRange) -> FilteredView<G> {
    let records = store.records();
    let lo = records.partition_point(|r| r.date() < range.start);
    let hi = records.partition_point(|r| r.date() <= range.end);

    FilteredView {
        records: store.shared(),
        span: lo..hi.max(lo),
        range,
        store_latest: store.latest(),
        _granularity: PhantomData,
    }
}
