//! Transaction pivot aggregation engine.
//!
//! Request flow: resolve the dimension, normalize filters into a cache key,
//! then serve from cache or fetch all requested dates from the record
//! source concurrently and fold them into a pivot result.

pub mod aggregator;
pub mod cache;
pub mod dimension;
pub mod filter;
pub mod paginate;

pub use cache::{CacheKey, ResultCache};
pub use dimension::{resolve, DimensionSpec};
pub use filter::Filters;
pub use paginate::{paginate, sort_row_keys, PageSlice, Pagination, SortOrder};

use crate::error::Result;
use crate::models::{PivotResult, PivotType, RawTransactionRecord};
use crate::services::RecordSource;
use chrono::NaiveDate;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// The aggregation engine: record source + result cache, shared across
/// request handlers. Results are returned as immutable `Arc`s and may be
/// freely shared without copying.
pub struct PivotEngine {
    source: Arc<dyn RecordSource>,
    cache: ResultCache,
}

impl PivotEngine {
    pub fn new(source: Arc<dyn RecordSource>, cache: ResultCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run one pivot aggregation, serving from cache when possible.
    ///
    /// Dates are independent, so tape fetches fan out concurrently and are
    /// awaited together before the CPU-bound fold begins. Concurrent
    /// identical requests share a single computation via the cache's
    /// single-flight discipline.
    pub async fn pivot(
        &self,
        stock_code: &str,
        dates: &[NaiveDate],
        pivot_type: PivotType,
        filters: Filters,
    ) -> Result<Arc<PivotResult>> {
        let spec = dimension::resolve(pivot_type);
        let key = CacheKey::new(stock_code, dates, pivot_type, filters);

        let source = self.source.clone();
        let stock = stock_code.to_string();
        let sorted_dates = key.dates().to_vec();
        let filters = key.filters().clone();

        self.cache
            .get_or_compute(key, || async move {
                let started = Instant::now();

                let fetches = sorted_dates
                    .iter()
                    .map(|&date| source.fetch(&stock, date));
                let per_date: Vec<Vec<RawTransactionRecord>> = try_join_all(fetches).await?;

                let records_by_date: BTreeMap<NaiveDate, Vec<RawTransactionRecord>> =
                    sorted_dates.iter().copied().zip(per_date).collect();
                let total_records: usize = records_by_date.values().map(|v| v.len()).sum();
                debug!(
                    stock = %stock,
                    total_records,
                    dates = sorted_dates.len(),
                    "Tape records fetched"
                );

                let result = aggregator::aggregate(&records_by_date, &spec, &filters);

                info!(
                    stock = %stock,
                    pivot_type = %pivot_type,
                    rows = result.row_count(),
                    total_records,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Pivot computed"
                );
                Ok(result)
            })
            .await
    }
}
