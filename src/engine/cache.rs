//! In-memory result cache with TTL expiry and single-flight computation.
//!
//! The cache is constructed once per process and injected into the engine;
//! it is never a source of truth and does not survive restarts. A trading
//! day's tape is append-only within the day, so TTL expiry is the only
//! invalidation needed.

use crate::constants::DEFAULT_CACHE_TTL_SECS;
use crate::engine::filter::Filters;
use crate::error::Result;
use crate::models::{PivotResult, PivotType};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Composite cache key. Construction sorts the dates and normalizes the
/// filters so logically identical requests collide to the same slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    stock_code: String,
    dates: Vec<NaiveDate>,
    pivot_type: PivotType,
    filters: Filters,
}

impl CacheKey {
    pub fn new(
        stock_code: &str,
        dates: &[NaiveDate],
        pivot_type: PivotType,
        filters: Filters,
    ) -> Self {
        let mut dates = dates.to_vec();
        dates.sort();
        dates.dedup();
        Self {
            stock_code: stock_code.to_string(),
            dates,
            pivot_type,
            filters: filters.normalized(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }
}

struct CacheEntry {
    result: Arc<PivotResult>,
    created_at: Instant,
}

/// TTL cache over completed pivot results with per-key single-flight:
/// N simultaneous identical misses trigger one computation and N-1 waiters.
pub struct ResultCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    inflight: Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Read TTL from PIVOT_CACHE_TTL_SECS, defaulting to 10 minutes
    pub fn from_env() -> Self {
        let ttl_secs = std::env::var("PIVOT_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        tracing::info!(ttl_secs, "Initializing pivot result cache");
        Self::new(Duration::from_secs(ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Return the cached result for `key`, or run `compute` to produce it.
    ///
    /// A lookup past TTL is a miss; the stale entry is overwritten by the
    /// recomputation. Failed computations are not cached. At most one
    /// computation per key runs at a time; losers of the race re-check the
    /// cache after the winner populates it.
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> Result<Arc<PivotResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PivotResult>>,
    {
        if let Some(result) = self.lookup(&key).await {
            debug!(pivot_type = %key.pivot_type, "Pivot cache hit");
            return Ok(result);
        }

        // Per-key computation lock; the map lock is held only to fetch it
        let key_lock = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(key.clone()).or_default().clone()
        };
        let _guard = key_lock.lock().await;

        // Another request may have computed while we waited
        if let Some(result) = self.lookup(&key).await {
            debug!(pivot_type = %key.pivot_type, "Pivot cache hit after wait");
            return Ok(result);
        }

        debug!(pivot_type = %key.pivot_type, "Pivot cache miss, computing");
        let outcome = compute().await;

        {
            let mut inflight = self.inflight.lock().await;
            inflight.remove(&key);
        }

        let result = Arc::new(outcome?);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                result: result.clone(),
                created_at: Instant::now(),
            },
        );
        Ok(result)
    }

    async fn lookup(&self, key: &CacheKey) -> Option<Arc<PivotResult>> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| {
            if entry.created_at.elapsed() < self.ttl {
                Some(entry.result.clone())
            } else {
                None
            }
        })
    }
}
