//! The comparison engine: pure functions that turn a hotel's usage series
//! and a period selection into year-over-year comparison metrics.
//!
//! Data flows Resolver -> Matcher -> Aggregator -> Calculator; every stage
//! is synchronous and side-effect free, so concurrent requests can share a
//! loaded series immutably.

pub mod aggregate;
pub mod calculator;
pub mod matcher;
pub mod period;
pub mod profile;
pub mod race;

pub use crate::error::EngineError;
pub use aggregate::{aggregate, Aggregates};
pub use calculator::{compute, CalculatorConfig};
pub use matcher::{match_days, MatchPolicy, MatchedPairSet};
pub use period::{comparison_period, resolve, ChallengeWindow, PeriodSelection, ResolvedPeriod};
pub use race::{rank_hotels, HotelStanding};

use time::Date;

use crate::domain::{DateRange, HotelSeries, MatchQuality, MetricsResult};

/// Everything one dashboard render needs: the resolved ranges, the metrics,
/// the match quality and the matched rows for charting.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashboardFigures {
    pub period: DateRange,
    pub comparison: DateRange,
    pub projected: bool,
    pub quality: MatchQuality,
    pub metrics: MetricsResult,
    pub pairs: MatchedPairSet,
}

/// Run the full pipeline for one hotel and one period selection.
pub fn evaluate(
    series: &HotelSeries,
    selection: &PeriodSelection,
    today: Date,
    policy: MatchPolicy,
    challenge: &ChallengeWindow,
    cfg: &CalculatorConfig,
) -> Result<DashboardFigures, EngineError> {
    let resolved = period::resolve(selection, today, challenge)?;
    let comparison = period::comparison_period(&resolved.range);

    let pairs = matcher::match_days(series, &resolved.range, &comparison, policy);
    let quality = pairs.quality();

    let agg = aggregate::aggregate(&pairs);
    let metrics = calculator::compute(&agg, &quality, cfg);

    Ok(DashboardFigures {
        period: resolved.range,
        comparison,
        projected: resolved.projected,
        quality,
        metrics,
        pairs,
    })
}
