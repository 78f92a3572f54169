//! Recency/frequency/monetary ranking.
//!
//! Entities are the distinct `registered` counts, since the data carries no
//! customer key. Two days with the same registered count are one entity.

use crate::aggregators::types::{DerivedTable, RfmLeaderboards, RfmRow};
use crate::filter::FilteredView;
use crate::store::Daily;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

struct Group {
    latest: NaiveDateTime,
    frequency: u64,
    monetary: u64,
}

/// One row per distinct `registered` value, ascending.
///
/// Recency is measured from the latest timestamp of the whole daily store,
/// not of the view, so the anchor does not move with the selected range.
pub fn rfm_rank(view: &FilteredView<Daily>) -> DerivedTable<RfmRow> {
    let Some(current) = view.store_latest() else {
        return DerivedTable::new("rfm", Vec::new());
    };

    let mut groups: BTreeMap<u64, Group> = BTreeMap::new();
    for r in view.records() {
        let group = groups.entry(r.registered).or_insert(Group {
            latest: r.timestamp,
            frequency: 0,
            monetary: 0,
        });
        group.latest = group.latest.max(r.timestamp);
        group.frequency += 1;
        group.monetary += r.total_count;
    }

    let rows = groups
        .into_iter()
        .map(|(registered, g)| RfmRow {
            registered,
            recency: (current - g.latest).num_days(),
            frequency: g.frequency,
            monetary: g.monetary,
        })
        .collect();
    DerivedTable::new("rfm", rows)
}

/// Top `n` rows by recency ascending, frequency descending and monetary
/// descending. Ties keep ascending `registered` order.
pub fn rfm_leaderboards(table: &DerivedTable<RfmRow>, n: usize) -> RfmLeaderboards {
    let top = |cmp: fn(&RfmRow, &RfmRow) -> std::cmp::Ordering| {
        let mut rows = table.rows.clone();
        rows.sort_by(cmp);
        rows.truncate(n);
        rows
    };

    RfmLeaderboards {
        by_recency: top(|a, b| a.recency.cmp(&b.recency)),
        by_frequency: top(|a, b| b.frequency.cmp(&a.frequency)),
        by_monetary: top(|a, b| b.monetary.cmp(&a.monetary)),
    }
}
