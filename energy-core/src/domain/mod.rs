mod date_range;
mod metrics;
mod usage_record;

pub use date_range::DateRange;
pub use metrics::{MatchQuality, MetricsResult, QualityBand};
pub use usage_record::{half_hour_labels, HotelSeries, UsageRecord, HALF_HOUR_SLOTS};
