use crate::aggregators::types::{DerivedTable, WeatherTotal};
use crate::aggregators::utility::sum_by;
use crate::filter::FilteredView;
use crate::store::Hourly;

/// Sum of `total_count` per weather condition over the hourly view.
pub fn weather_total(view: &FilteredView<Hourly>) -> DerivedTable<WeatherTotal> {
    let rows = sum_by(
        view.records(),
        |r| r.weather_condition.clone(),
        |r| r.total_count,
    )
    .into_iter()
    .map(|(weather_condition, total_count)| WeatherTotal {
        weather_condition,
        total_count,
    })
    .collect();
    DerivedTable::new("weather_total", rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregators::fixtures::{full_view, record};
    use crate::records::{Season, WeatherCondition};

    #[test]
    fn test_weather_total_over_hours() {
        let view = full_view::<Hourly>(vec![
            record(1, "2011-01-01 00:00:00", Season::Spring, WeatherCondition::Misty, 3, 1),
            record(2, "2011-01-01 01:00:00", Season::Spring, WeatherCondition::Clear, 5, 0),
            record(3, "2011-01-01 02:00:00", Season::Spring, WeatherCondition::Misty, 2, 2),
            record(4, "2011-01-01 03:00:00", Season::Spring, WeatherCondition::Severe, 1, 0),
        ]);
        let table = weather_total(&view);
        assert_eq!(
            table.rows,
            vec![
                WeatherTotal {
                    weather_condition: WeatherCondition::Clear,
                    total_count: 5
                },
                WeatherTotal {
                    weather_condition: WeatherCondition::Misty,
                    total_count: 8
                },
                WeatherTotal {
                    weather_condition: WeatherCondition::Severe,
                    total_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_empty_view() {
        assert!(weather_total(&full_view(vec![])).is_empty());
    }
}
