use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use energy_core::domain::HotelSeries;
use time::Date;

use crate::error::ServiceError;
use crate::sources::{load_or_simulate, UsageSource};

/// A loaded series plus its provenance. `simulated` marks fallback data and
/// must be surfaced on every payload built from it.
#[derive(Debug)]
pub struct CachedSeries {
    pub series: HotelSeries,
    pub simulated: bool,
    pub loaded_at: SystemTime,
}

/// Read-through cache for loaded hotel series, keyed by source identity.
///
/// Series are load-once, reuse-many: entries never expire on their own and
/// are only dropped through `invalidate` or `clear`. Keying by source
/// identity (rather than by hotel or by loader function) keeps
/// differently-configured dashboard instances in one process from seeing
/// each other's data.
#[derive(Default)]
pub struct SeriesCache {
    inner: RwLock<HashMap<String, Arc<CachedSeries>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load(
        &self,
        source: &dyn UsageSource,
        hotel: &str,
        today: Date,
    ) -> Result<Arc<CachedSeries>, ServiceError> {
        let key = source.identity();

        if let Some(cached) = self.lookup(&key) {
            metrics::counter!("series_cache_hits_total").increment(1);
            return Ok(cached);
        }

        metrics::counter!("series_cache_misses_total").increment(1);
        let (records, simulated) = load_or_simulate(source, hotel, today).await;
        let entry = Arc::new(CachedSeries {
            series: HotelSeries::from_records(hotel, records),
            simulated,
            loaded_at: SystemTime::now(),
        });

        let mut inner = self.inner.write().expect("series cache lock poisoned");
        // A concurrent request may have loaded the same key meanwhile; the
        // first insert wins so both requests see one series.
        Ok(inner.entry(key).or_insert(entry).clone())
    }

    pub fn invalidate(&self, key: &str) -> bool {
        let mut inner = self.inner.write().expect("series cache lock poisoned");
        inner.remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write().expect("series cache lock poisoned");
        inner.clear();
    }

    fn lookup(&self, key: &str) -> Option<Arc<CachedSeries>> {
        let inner = self.inner.read().expect("series cache lock poisoned");
        inner.get(key).cloned()
    }
}
