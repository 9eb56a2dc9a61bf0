use crate::domain::{MatchQuality, MetricsResult};
use crate::engine::aggregate::Aggregates;

/// Below this many kWh the comparison total is treated as "no prior usage"
/// for the progress calculation. The progress denominator is proportional to
/// the comparison total, so tiny totals would otherwise blow the ratio up.
pub const MIN_PROGRESS_DENOMINATOR_KWH: f64 = 1e-6;

/// Reporting constants and goals, injected per dashboard instance. The grid
/// carbon intensity changes per reporting year and the guest count per
/// hotel, so none of these may be baked in.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculatorConfig {
    /// Grid carbon intensity, kg CO2 per kWh.
    pub electricity_factor: f64,
    /// The savings goal versus the comparison period, in percent.
    pub target_savings_percent: f64,
    /// Average occupied guest-nights, for per-guest normalisation.
    pub avg_guests_per_night: f64,
    /// kg CO2 absorbed by one tree per year, for the trees equivalence.
    pub co2_per_tree_kg: f64,
}

/// Derive the comparison metrics from aggregated usage.
///
/// Every division is guarded: zero-usage and zero-comparison periods are the
/// expected steady state for new meters and rolling imports, so this
/// function never fails and never emits NaN or infinity.
pub fn compute(agg: &Aggregates, quality: &MatchQuality, cfg: &CalculatorConfig) -> MetricsResult {
    let current = agg.current_total;
    let comparison = agg.comparison_total;

    let percent_change = if comparison == 0.0 {
        0.0
    } else {
        (current - comparison) / comparison * 100.0
    };

    let kwh_saved = (comparison - current).max(0.0);
    let co2_saved = kwh_saved * cfg.electricity_factor;

    let target_usage = comparison * (1.0 - cfg.target_savings_percent / 100.0);
    let goal_span = comparison - target_usage;
    let progress_percentage = if current < comparison && goal_span > MIN_PROGRESS_DENOMINATOR_KWH {
        ((comparison - current) / goal_span * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let guest_usage = if quality.matched_day_count > 0 && cfg.avg_guests_per_night > 0.0 {
        current / (quality.matched_day_count as f64 * cfg.avg_guests_per_night)
    } else {
        0.0
    };

    let trees_equivalent = if cfg.co2_per_tree_kg > 0.0 {
        (co2_saved / cfg.co2_per_tree_kg).floor() as i64
    } else {
        0
    };

    MetricsResult {
        current_total: current,
        comparison_total: comparison,
        percent_change,
        current_daily_avg: agg.current_daily_avg,
        comparison_daily_avg: agg.comparison_daily_avg,
        kwh_saved,
        co2_saved,
        trees_equivalent,
        guest_usage,
        progress_percentage,
        remaining_kwh: (current - target_usage).max(0.0),
        target_savings_percent: cfg.target_savings_percent,
        insufficient_data: quality.matched_day_count == 0 || comparison == 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG: CalculatorConfig = CalculatorConfig {
        electricity_factor: 0.20493,
        target_savings_percent: 10.0,
        avg_guests_per_night: 202.0,
        co2_per_tree_kg: 22.0,
    };

    fn make_agg(current: f64, comparison: f64, days: usize) -> (Aggregates, MatchQuality) {
        let quality = MatchQuality::new(days, days.max(1));
        let mean = |total: f64| {
            if days == 0 {
                None
            } else {
                Some(total / days as f64)
            }
        };
        (
            Aggregates {
                current_total: current,
                comparison_total: comparison,
                current_daily_avg: mean(current),
                comparison_daily_avg: mean(comparison),
                current_days: days,
                comparison_days: days,
            },
            quality,
        )
    }

    #[test]
    fn zero_comparison_is_safe() {
        let (agg, quality) = make_agg(500.0, 0.0, 5);
        let metrics = compute(&agg, &quality, &CFG);

        assert_eq!(metrics.percent_change, 0.0);
        assert_eq!(metrics.kwh_saved, 0.0);
        assert_eq!(metrics.co2_saved, 0.0);
        assert_eq!(metrics.progress_percentage, 0.0);
        assert!(metrics.insufficient_data);
        assert!(metrics.percent_change.is_finite());
        assert!(metrics.guest_usage.is_finite());
    }

    #[test]
    fn reduction_keeps_negative_sign() {
        let (agg, quality) = make_agg(900.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.percent_change, -10.0);
    }

    #[test]
    fn savings_sign_invariant() {
        let (agg, quality) = make_agg(900.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.kwh_saved, 100.0);
        assert!(metrics.kwh_saved > 0.0);

        let (agg, quality) = make_agg(1000.0, 900.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.kwh_saved, 0.0);
        assert_eq!(metrics.co2_saved, 0.0);
        assert_eq!(metrics.progress_percentage, 0.0);
    }

    #[test]
    fn progress_clamps_at_100_for_over_achievement() {
        // 30% reduction against a 10% goal.
        let (agg, quality) = make_agg(700.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.progress_percentage, 100.0);

        // Exactly on goal.
        let (agg, quality) = make_agg(900.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.progress_percentage, 100.0);

        // Halfway to goal.
        let (agg, quality) = make_agg(950.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert!((metrics.progress_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn tiny_comparison_total_does_not_explode_progress() {
        let (agg, quality) = make_agg(1e-9, 5e-9, 3);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.progress_percentage, 0.0);
        assert!(metrics.progress_percentage.is_finite());
    }

    #[test]
    fn guest_usage_normalises_by_matched_nights() {
        let (agg, quality) = make_agg(2020.0, 2500.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        // 2020 kWh over 10 nights of 202 guests.
        assert!((metrics.guest_usage - 1.0).abs() < 1e-9);
    }

    #[test]
    fn guest_usage_is_zero_without_matched_days() {
        let (agg, quality) = make_agg(0.0, 0.0, 0);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.guest_usage, 0.0);
        assert!(metrics.insufficient_data);
    }

    #[test]
    fn trees_equivalent_uses_integer_floor() {
        // 500 kWh saved -> 102.465 kg CO2 -> 4 trees, not 5.
        let (agg, quality) = make_agg(500.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert!((metrics.co2_saved - 102.465).abs() < 1e-9);
        assert_eq!(metrics.trees_equivalent, 4);
    }

    #[test]
    fn remaining_kwh_measures_distance_to_target() {
        let (agg, quality) = make_agg(950.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        // Target is 900; still 50 kWh above it.
        assert!((metrics.remaining_kwh - 50.0).abs() < 1e-9);

        let (agg, quality) = make_agg(850.0, 1000.0, 10);
        let metrics = compute(&agg, &quality, &CFG);
        assert_eq!(metrics.remaining_kwh, 0.0);
    }
}
