use crate::engine::matcher::MatchedPairSet;

/// Usage totals and daily averages over the matched days of each period.
///
/// A side with zero rows has a total of 0.0 and an average of `None`; NaN is
/// never produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aggregates {
    pub current_total: f64,
    pub comparison_total: f64,
    pub current_daily_avg: Option<f64>,
    pub comparison_daily_avg: Option<f64>,
    pub current_days: usize,
    pub comparison_days: usize,
}

pub fn aggregate(pairs: &MatchedPairSet) -> Aggregates {
    let current_total: f64 = pairs.current_rows.iter().map(|r| r.total_kwh).sum();
    let comparison_total: f64 = pairs.comparison_rows.iter().map(|r| r.total_kwh).sum();

    let current_days = pairs.current_rows.len();
    let comparison_days = pairs.comparison_rows.len();

    Aggregates {
        current_total,
        comparison_total,
        current_daily_avg: mean(current_total, current_days),
        comparison_daily_avg: mean(comparison_total, comparison_days),
        current_days,
        comparison_days,
    }
}

fn mean(total: f64, days: usize) -> Option<f64> {
    if days == 0 {
        None
    } else {
        Some(total / days as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UsageRecord;
    use time::macros::date;

    #[test]
    fn totals_and_averages_over_matched_rows() {
        let pairs = MatchedPairSet {
            current_rows: vec![
                UsageRecord {
                    date: date!(2025 - 04 - 01),
                    hotel: "Westin".to_string(),
                    total_kwh: 80.0,
                    half_hours: None,
                },
                UsageRecord {
                    date: date!(2025 - 04 - 02),
                    hotel: "Westin".to_string(),
                    total_kwh: 100.0,
                    half_hours: None,
                },
            ],
            comparison_rows: vec![
                UsageRecord {
                    date: date!(2024 - 04 - 01),
                    hotel: "Westin".to_string(),
                    total_kwh: 110.0,
                    half_hours: None,
                },
                UsageRecord {
                    date: date!(2024 - 04 - 02),
                    hotel: "Westin".to_string(),
                    total_kwh: 90.0,
                    half_hours: None,
                },
            ],
            matched_day_count: 2,
            expected_day_count: 2,
        };

        let agg = aggregate(&pairs);
        assert_eq!(agg.current_total, 180.0);
        assert_eq!(agg.comparison_total, 200.0);
        assert_eq!(agg.current_daily_avg, Some(90.0));
        assert_eq!(agg.comparison_daily_avg, Some(100.0));
    }

    #[test]
    fn empty_sides_report_zero_total_and_no_average() {
        let pairs = MatchedPairSet {
            current_rows: vec![],
            comparison_rows: vec![],
            matched_day_count: 0,
            expected_day_count: 10,
        };

        let agg = aggregate(&pairs);
        assert_eq!(agg.current_total, 0.0);
        assert_eq!(agg.comparison_total, 0.0);
        assert_eq!(agg.current_daily_avg, None);
        assert_eq!(agg.comparison_daily_avg, None);
    }
}
