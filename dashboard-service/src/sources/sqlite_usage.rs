use energy_core::domain::UsageRecord;
use sqlx::sqlite::SqlitePool;

use crate::error::ServiceError;
use crate::sources::UsageSource;

/// The production source: one hotel's half-hourly history from the
/// `hh_data` table of the electricity database.
pub struct SqliteUsageSource {
    pool: SqlitePool,
    meter_point: String,
    hotel: String,
}

impl SqliteUsageSource {
    pub fn new(pool: SqlitePool, meter_point: &str, hotel: &str) -> Self {
        Self {
            pool,
            meter_point: meter_point.to_string(),
            hotel: hotel.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl UsageSource for SqliteUsageSource {
    fn identity(&self) -> String {
        format!("sqlite:{}", self.meter_point)
    }

    async fn fetch(&self) -> Result<Vec<UsageRecord>, ServiceError> {
        energy_core::db::usage_history(&self.pool, &self.meter_point, &self.hotel)
            .await
            .map_err(|e| ServiceError::Source(e.to_string()))
    }
}
