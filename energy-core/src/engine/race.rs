use time::Date;

use crate::domain::{HotelSeries, MatchQuality};
use crate::engine::calculator::CalculatorConfig;
use crate::engine::matcher::MatchPolicy;
use crate::engine::period::{ChallengeWindow, PeriodSelection};
use crate::engine::{evaluate, EngineError};

/// One hotel's position in the energy-reduction race.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HotelStanding {
    pub hotel: String,
    /// The race metric: reduction versus the comparison period, in percent.
    /// Increases count as zero, not negative progress.
    pub energy_reduction: f64,
    pub percent_change: f64,
    pub progress_percentage: f64,
    pub kwh_saved: f64,
    pub current_total: f64,
    pub comparison_total: f64,
    pub quality: MatchQuality,
    pub insufficient_data: bool,
}

/// Compute standings for a group of hotels over one shared period selection
/// and policy, best reduction first. Each hotel carries its own calculator
/// config (guest counts differ per hotel). Hotels with no usable comparison
/// rank by their (zeroed) reduction like everyone else, but carry the
/// `insufficient_data` flag so the caller can present them separately.
pub fn rank_hotels(
    entries: &[(&HotelSeries, CalculatorConfig)],
    selection: &PeriodSelection,
    today: Date,
    policy: MatchPolicy,
    challenge: &ChallengeWindow,
) -> Result<Vec<HotelStanding>, EngineError> {
    let mut standings = Vec::with_capacity(entries.len());

    for (series, cfg) in entries {
        let figures = evaluate(series, selection, today, policy, challenge, cfg)?;
        let metrics = &figures.metrics;
        standings.push(HotelStanding {
            hotel: series.hotel().to_string(),
            energy_reduction: (-metrics.percent_change).max(0.0),
            percent_change: metrics.percent_change,
            progress_percentage: metrics.progress_percentage,
            kwh_saved: metrics.kwh_saved,
            current_total: metrics.current_total,
            comparison_total: metrics.comparison_total,
            quality: figures.quality,
            insufficient_data: metrics.insufficient_data,
        });
    }

    standings.sort_by(|a, b| b.energy_reduction.total_cmp(&a.energy_reduction));
    Ok(standings)
}
