mod usage_queries;

pub use usage_queries::{date_coverage, usage_history, DateCoverage};
