use crate::aggregators::types::{DerivedTable, MonthlyTrend};
use crate::aggregators::utility::sum_by;
use crate::filter::FilteredView;
use crate::store::Daily;

/// Sum of `total_count` per `(year, month)`, ordered by year then Jan..Dec.
pub fn monthly_trend(view: &FilteredView<Daily>) -> DerivedTable<MonthlyTrend> {
    let rows = sum_by(view.records(), |r| (r.year, r.month), |r| r.total_count)
        .into_iter()
        .map(|((year, month), total_count)| MonthlyTrend {
            year,
            month,
            total_count,
        })
        .collect();
    DerivedTable::new("monthly_trend", rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::fixtures::{full_view, record};
    use crate::records::{Month, Season, WeatherCondition};

    #[test]
    fn test_same_month_in_two_years_is_two_rows() {
        let view = full_view::<Daily>(vec![
            record(1, "2011-01-05", Season::Spring, WeatherCondition::Clear, 10, 0),
            record(2, "2011-01-06", Season::Spring, WeatherCondition::Clear, 5, 1),
            record(3, "2011-12-01", Season::Winter, WeatherCondition::Clear, 7, 0),
            record(4, "2012-01-05", Season::Spring, WeatherCondition::Clear, 2, 2),
        ]);
        let table = monthly_trend(&view);
        assert_eq!(
            table.rows,
            vec![
                MonthlyTrend {
                    year: 2011,
                    month: Month::Jan,
                    total_count: 16
                },
                MonthlyTrend {
                    year: 2011,
                    month: Month::Dec,
                    total_count: 7
                },
                MonthlyTrend {
                    year: 2012,
                    month: Month::Jan,
                    total_count: 4
                },
            ]
        );
    }

    #[test]
    fn test_months_ordered_by_calendar_not_name() {
        let view = full_view::<Daily>(vec![
            record(1, "2011-04-01", Season::Spring, WeatherCondition::Clear, 1, 0),
            record(2, "2011-08-01", Season::Summer, WeatherCondition::Clear, 1, 0),
            record(3, "2011-02-01", Season::Winter, WeatherCondition::Clear, 1, 0),
        ]);
        let months: Vec<Month> = monthly_trend(&view).rows.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![Month::Feb, Month::Apr, Month::Aug]);
    }
}
