//! Seasonal breakdowns over the daily view.

use crate::aggregators::types::{DerivedTable, SeasonSplit, SeasonTotal};
use crate::aggregators::utility::sum_by;
use crate::filter::FilteredView;
use crate::records::Season;
use crate::store::Daily;
use std::collections::BTreeMap;

/// Sum of `total_count` per season, in calendar season order.
pub fn season_total(view: &FilteredView<Daily>) -> DerivedTable<SeasonTotal> {
    let rows = sum_by(view.records(), |r| r.season.clone(), |r| r.total_count)
        .into_iter()
        .map(|(season, total_count)| SeasonTotal {
            season,
            total_count,
        })
        .collect();
    DerivedTable::new("season_total", rows)
}

/// Registered and casual sums per season.
pub fn season_split(view: &FilteredView<Daily>) -> DerivedTable<SeasonSplit> {
    let mut groups: BTreeMap<Season, (u64, u64)> = BTreeMap::new();
    for r in view.records() {
        let entry = groups.entry(r.season.clone()).or_default();
        entry.0 += r.registered;
        entry.1 += r.casual;
    }

    let rows = groups
        .into_iter()
        .map(|(season, (registered, casual))| SeasonSplit {
            season,
            registered,
            casual,
        })
        .collect();
    DerivedTable::new("season_split", rows)
}
