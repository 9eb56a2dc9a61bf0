/// How representative a comparison is: the share of expected days in the
/// current period for which a valid comparison pair exists.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchQuality {
    pub matched_day_count: usize,
    pub expected_day_count: usize,
    pub percentage: f64,
}

impl MatchQuality {
    pub fn new(matched_day_count: usize, expected_day_count: usize) -> Self {
        let percentage = if expected_day_count == 0 {
            0.0
        } else {
            matched_day_count as f64 / expected_day_count as f64 * 100.0
        };
        Self {
            matched_day_count,
            expected_day_count,
            percentage,
        }
    }

    pub fn band(&self) -> QualityBand {
        if self.percentage > 80.0 {
            QualityBand::High
        } else if self.percentage > 50.0 {
            QualityBand::Medium
        } else {
            QualityBand::Limited
        }
    }
}

/// Qualitative banding shown next to comparison figures so a thin match is
/// presented as low-confidence rather than authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum QualityBand {
    High,
    Medium,
    Limited,
}

/// Derived comparison metrics for one hotel and one period selection.
///
/// Recomputed on every request; never persisted. Sign convention: negative
/// `percent_change` means usage went down versus the comparison period.
/// Daily averages are `None` when a side has no matched rows, so a missing
/// value can be rendered as a placeholder instead of NaN.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsResult {
    pub current_total: f64,
    pub comparison_total: f64,
    pub percent_change: f64,
    pub current_daily_avg: Option<f64>,
    pub comparison_daily_avg: Option<f64>,
    pub kwh_saved: f64,
    pub co2_saved: f64,
    pub trees_equivalent: i64,
    pub guest_usage: f64,
    pub progress_percentage: f64,
    pub remaining_kwh: f64,
    pub target_savings_percent: f64,
    /// Set when there were no matched pairs or no comparison usage at all.
    pub insufficient_data: bool,
}
