//! Per-day registered and casual totals and the headline metrics.

use crate::aggregators::types::{CasualTotal, DailyCount, DerivedTable, RegisteredTotal, Summary};
use crate::aggregators::utility::sum_by;
use crate::filter::FilteredView;
use crate::store::Daily;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` window the headline rental total is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for CountWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2012, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl CountWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Sum of `registered` per distinct day.
pub fn registered_total(view: &FilteredView<Daily>) -> DerivedTable<RegisteredTotal> {
    let rows = sum_by(view.records(), |r| r.date(), |r| r.registered)
        .into_iter()
        .map(|(datetime, register_sum)| RegisteredTotal {
            datetime,
            register_sum,
        })
        .collect();
    DerivedTable::new("registered_total", rows)
}

/// Sum of `casual` per distinct day.
pub fn casual_total(view: &FilteredView<Daily>) -> DerivedTable<CasualTotal> {
    let rows = sum_by(view.records(), |r| r.date(), |r| r.casual)
        .into_iter()
        .map(|(datetime, casual_sum)| CasualTotal {
            datetime,
            casual_sum,
        })
        .collect();
    DerivedTable::new("casual_total", rows)
}

/// Records of the view that fall inside `window`, in store order.
pub fn daily_count(view: &FilteredView<Daily>, window: &CountWindow) -> DerivedTable<DailyCount> {
    let rows = view
        .records()
        .iter()
        .filter(|r| window.contains(r.date()))
        .map(|r| DailyCount {
            datetime: r.date(),
            total_count: r.total_count,
        })
        .collect();
    DerivedTable::new("daily_count", rows)
}

pub fn summary(
    counts: &DerivedTable<DailyCount>,
    registered: &DerivedTable<RegisteredTotal>,
    casual: &DerivedTable<CasualTotal>,
) -> Summary {
    Summary {
        total_rentals: counts.rows.iter().map(|r| r.total_count).sum(),
        total_registered: registered.rows.iter().map(|r| r.register_sum).sum(),
        total_casual: casual.rows.iter().map(|r| r.casual_sum).sum(),
    }
}
