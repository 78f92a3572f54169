//! Explicit pipeline context for one analysis session.
//!
//! The context owns both record stores. Every call to [`PipelineContext::rollups`]
//! filters the stores once and feeds the same views to every aggregator.

use crate::aggregators::monthly::monthly_trend;
use crate::aggregators::rfm::{rfm_leaderboards, rfm_rank};
use crate::aggregators::season::{season_split, season_total};
use crate::aggregators::totals::{
    CountWindow, casual_total, daily_count, registered_total, summary,
};
use crate::aggregators::types::{
    CasualTotal, DailyCount, DerivedTable, MonthlyTrend, RegisteredTotal, RfmLeaderboards, RfmRow,
    SeasonSplit, SeasonTotal, Summary, WeatherTotal,
};
use crate::aggregators::weather::weather_total;
use crate::error::Result;
use crate::filter::{DateRange, FilteredView, filter_range};
use crate::store::{Daily, DailyStore, Hourly, HourlyStore};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Tunables that shape the supplementary tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupSettings {
    pub count_window: CountWindow,
    /// Rows kept in each RFM leaderboard.
    pub rfm_top: usize,
}

impl Default for RollupSettings {
    fn default() -> Self {
        Self {
            count_window: CountWindow::default(),
            rfm_top: 5,
        }
    }
}

/// Every derived table for one date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollups {
    pub range: DateRange,
    pub summary: Summary,
    pub daily_count: DerivedTable<DailyCount>,
    pub registered_total: DerivedTable<RegisteredTotal>,
    pub casual_total: DerivedTable<CasualTotal>,
    pub weather_total: DerivedTable<WeatherTotal>,
    pub season_total: DerivedTable<SeasonTotal>,
    pub season_split: DerivedTable<SeasonSplit>,
    pub monthly_trend: DerivedTable<MonthlyTrend>,
    pub rfm: DerivedTable<RfmRow>,
    pub rfm_leaderboards: RfmLeaderboards,
}

/// The daily and hourly stores for one session, plus rollup settings.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    daily: DailyStore,
    hourly: HourlyStore,
    settings: RollupSettings,
}

impl PipelineContext {
    pub fn new(daily: DailyStore, hourly: HourlyStore) -> Self {
        Self {
            daily,
            hourly,
            settings: RollupSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RollupSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn daily(&self) -> &DailyStore {
        &self.daily
    }

    pub fn hourly(&self) -> &HourlyStore {
        &self.hourly
    }

    pub fn settings(&self) -> &RollupSettings {
        &self.settings
    }

    /// The full daily date span, used when the caller picks no range.
    pub fn default_range(&self) -> Option<DateRange> {
        let (min, max) = self.daily.bounds()?;
        DateRange::new(min, max).ok()
    }

    fn views(&self, start: NaiveDate, end: NaiveDate) -> Result<Views> {
        let range = DateRange::new(start, end)?;
        let daily = filter_range(&self.daily, range);
        let hourly = filter_range(&self.hourly, range);

        if daily.is_empty() {
            warn!(%start, %end, dataset = "daily", "No records in range");
        }
        if hourly.is_empty() {
            warn!(%start, %end, dataset = "hourly", "No records in range");
        }
        debug!(
            daily = daily.len(),
            hourly = hourly.len(),
            "Filtered views ready"
        );

        Ok(Views {
            range,
            daily,
            hourly,
        })
    }

    /// Computes every table sequentially.
    #[tracing::instrument(skip_all, fields(start = %start, end = %end))]
    pub fn rollups(&self, start: NaiveDate, end: NaiveDate) -> Result<Rollups> {
        let Views {
            range,
            daily,
            hourly,
        } = self.views(start, end)?;

        let tables = Tables {
            daily_count: daily_count(&daily, &self.settings.count_window),
            registered_total: registered_total(&daily),
            casual_total: casual_total(&daily),
            weather_total: weather_total(&hourly),
            season_total: season_total(&daily),
            season_split: season_split(&daily),
            monthly_trend: monthly_trend(&daily),
            rfm: rfm_rank(&daily),
        };
        Ok(self.assemble(range, tables))
    }

    /// Same result as [`rollups`](Self::rollups), with each aggregator on the
    /// blocking pool. Must be called from within a tokio runtime.
    #[tracing::instrument(skip_all, fields(start = %start, end = %end))]
    pub async fn rollups_concurrent(&self, start: NaiveDate, end: NaiveDate) -> Result<Rollups> {
        let Views {
            range,
            daily,
            hourly,
        } = self.views(start, end)?;
        let window = self.settings.count_window;

        macro_rules! spawn {
            ($view:expr, $aggregate:expr) => {{
                let view = $view.clone();
                tokio::task::spawn_blocking(move || $aggregate(&view))
            }};
        }

        let (
            daily_count,
            registered_total,
            casual_total,
            weather_total,
            season_total,
            season_split,
            monthly_trend,
            rfm,
        ) = tokio::try_join!(
            spawn!(daily, |v: &FilteredView<Daily>| daily_count(v, &window)),
            spawn!(daily, registered_total),
            spawn!(daily, casual_total),
            spawn!(hourly, weather_total),
            spawn!(daily, season_total),
            spawn!(daily, season_split),
            spawn!(daily, monthly_trend),
            spawn!(daily, rfm_rank),
        )?;

        let tables = Tables {
            daily_count,
            registered_total,
            casual_total,
            weather_total,
            season_total,
            season_split,
            monthly_trend,
            rfm,
        };
        Ok(self.assemble(range, tables))
    }

    fn assemble(&self, range: DateRange, tables: Tables) -> Rollups {
        let summary = summary(
            &tables.daily_count,
            &tables.registered_total,
            &tables.casual_total,
        );
        let rfm_leaderboards = rfm_leaderboards(&tables.rfm, self.settings.rfm_top);

        info!(
            total_rentals = summary.total_rentals,
            total_registered = summary.total_registered,
            total_casual = summary.total_casual,
            months = tables.monthly_trend.len(),
            rfm_groups = tables.rfm.len(),
            "Rollups computed"
        );

        Rollups {
            range,
            summary,
            daily_count: tables.daily_count,
            registered_total: tables.registered_total,
            casual_total: tables.casual_total,
            weather_total: tables.weather_total,
            season_total: tables.season_total,
            season_split: tables.season_split,
            monthly_trend: tables.monthly_trend,
            rfm: tables.rfm,
            rfm_leaderboards,
        }
    }
}

struct Views {
    range: DateRange,
    daily: FilteredView<Daily>,
    hourly: FilteredView<Hourly>,
}

struct Tables {
    daily_count: DerivedTable<DailyCount>,
    registered_total: DerivedTable<RegisteredTotal>,
    casual_total: DerivedTable<CasualTotal>,
    weather_total: DerivedTable<WeatherTotal>,
    season_total: DerivedTable<SeasonTotal>,
    season_split: DerivedTable<SeasonSplit>,
    monthly_trend: DerivedTable<MonthlyTrend>,
    rfm: DerivedTable<RfmRow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RollupError;
    use crate::store::load;

    const DAILY: &str = "\
rec_id,datetime,season,year,month,weather_condition,casual,registered,total_count
1,2011-01-01,Spring,2011,Jan,Clear/Partly Cloudy,5,10,15
2,2011-01-02,Spring,2011,Jan,Misty/Cloudy,2,8,10
3,2011-06-01,Summer,2011,Jun,Clear/Partly Cloudy,0,20,20
";

    const HOURLY: &str = "\
rec_id,datetime,hours,season,year,month,weather_condition,casual,registered,total_count
1,2011-01-01,0,Spring,2011,Jan,Clear/Partly Cloudy,1,2,3
2,2011-01-01,1,Spring,2011,Jan,Misty/Cloudy,0,4,4
3,2011-06-01,12,Summer,2011,Jun,Clear/Partly Cloudy,2,2,4
";

    fn context() -> PipelineContext {
        let (daily, hourly) = load(DAILY.as_bytes(), HOURLY.as_bytes()).unwrap();
        PipelineContext::new(daily, hourly)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rollups_over_full_range() {
        let ctx = context();
        let range = ctx.default_range().unwrap();
        let rollups = ctx.rollups(range.start(), range.end()).unwrap();

        assert_eq!(rollups.summary.total_rentals, 45);
        assert_eq!(rollups.summary.total_registered, 38);
        assert_eq!(rollups.summary.total_casual, 7);
        assert_eq!(rollups.season_total.len(), 2);
        assert_eq!(rollups.monthly_trend.len(), 2);
        assert_eq!(rollups.weather_total.len(), 2);
        assert_eq!(rollups.rfm_leaderboards.by_recency[0].registered, 20);
    }

    #[test]
    fn test_inverted_range_stops_before_aggregation() {
        let err = context()
            .rollups(date(2011, 2, 1), date(2011, 1, 1))
            .unwrap_err();
        assert!(matches!(err, RollupError::InvalidRange { .. }));
    }

    #[test]
    fn test_empty_range_yields_empty_tables() {
        let rollups = context()
            .rollups(date(2011, 3, 1), date(2011, 3, 31))
            .unwrap();
        assert!(rollups.registered_total.is_empty());
        assert!(rollups.weather_total.is_empty());
        assert!(rollups.rfm.is_empty());
        assert!(rollups.rfm_leaderboards.by_monetary.is_empty());
        assert_eq!(rollups.summary.total_rentals, 0);
    }

    #[test]
    fn test_settings_are_applied() {
        let ctx = context().with_settings(RollupSettings {
            count_window: CountWindow {
                start: date(2011, 1, 2),
                end: date(2011, 1, 3),
            },
            rfm_top: 1,
        });
        let rollups = ctx.rollups(date(2011, 1, 1), date(2011, 12, 31)).unwrap();
        assert_eq!(rollups.summary.total_rentals, 10);
        assert_eq!(rollups.rfm_leaderboards.by_frequency.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let ctx = context();
        let sequential = ctx.rollups(date(2011, 1, 1), date(2011, 12, 31)).unwrap();
        let concurrent = ctx
            .rollups_concurrent(date(2011, 1, 1), date(2011, 12, 31))
            .await
            .unwrap();
        assert_eq!(sequential, concurrent);
    }
}
