mod csv_usage;
mod simulated;
mod sqlite_usage;

pub use csv_usage::{read_csv_rows, CsvUsageSource};
pub use simulated::SimulatedUsageSource;
pub use sqlite_usage::SqliteUsageSource;

use energy_core::domain::UsageRecord;
use time::macros::date;
use time::Date;

use crate::error::ServiceError;

/// A provider of one hotel's raw usage rows.
///
/// `identity` keys the series cache, so two sources reading the same data
/// must report the same identity and differently-configured sources must
/// not collide.
#[async_trait::async_trait]
pub trait UsageSource: Send + Sync {
    fn identity(&self) -> String;
    async fn fetch(&self) -> Result<Vec<UsageRecord>, ServiceError>;
}

/// Validation applied to every loaded row.
///
/// Rules:
/// - kWh must be non-negative.
/// - the date must be within a broad sanity window [2000-01-01, 2100-01-01].
pub fn validate_usage_record(record: &UsageRecord) -> Result<(), ServiceError> {
    if record.total_kwh < 0.0 {
        return Err(ServiceError::Source("kwh must be non-negative".to_string()));
    }

    let min_date: Date = date!(2000 - 01 - 01);
    let max_date: Date = date!(2100 - 01 - 01);

    if record.date < min_date || record.date > max_date {
        return Err(ServiceError::Source("date out of allowed range".to_string()));
    }

    Ok(())
}

/// Drop rows that fail validation, counting each rejection.
pub fn sanitize(records: Vec<UsageRecord>) -> Vec<UsageRecord> {
    records
        .into_iter()
        .filter(|record| match validate_usage_record(record) {
            Ok(()) => true,
            Err(e) => {
                metrics::counter!("usage_rows_rejected_total").increment(1);
                tracing::warn!(error = %e, date = %record.date, "rejecting usage row");
                false
            }
        })
        .collect()
}

/// Fetch from the primary source, degrading to the simulated generator when
/// it is unavailable. The returned flag is `true` for simulated data and
/// must follow the series all the way to the rendering layer: synthetic
/// usage is never presented as real.
pub async fn load_or_simulate(
    primary: &dyn UsageSource,
    hotel: &str,
    today: Date,
) -> (Vec<UsageRecord>, bool) {
    match primary.fetch().await {
        Ok(records) => (sanitize(records), false),
        Err(e) => {
            metrics::counter!("source_fallback_total").increment(1);
            tracing::warn!(error = %e, hotel, "usage source unavailable, serving simulated data");
            let fallback = SimulatedUsageSource::new(hotel, today);
            match fallback.fetch().await {
                Ok(records) => (records, true),
                // The generator is in-memory and cannot fail in practice.
                Err(_) => (Vec::new(), true),
            }
        }
    }
}
