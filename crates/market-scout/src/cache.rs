//! Report Cache: per-ticker memoization of finished analyses

use crate::model::{AnalysisReport, Ticker};
use cached::{Cached, TimedCache};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Lifetime of a cached report
pub const REPORT_TTL: Duration = Duration::from_secs(3600);

/// Thread-safe TTL cache of analysis reports keyed by ticker
///
/// Concurrent misses for the same ticker are serialized on a per-key lock,
/// so `compute_fn` runs at most once per live entry. Failed computations
/// are not cached.
#[derive(Clone)]
pub struct ReportCache {
    entries: Arc<RwLock<TimedCache<Ticker, AnalysisReport>>>,
    in_flight: Arc<Mutex<HashMap<Ticker, Arc<Mutex<()>>>>>,
    ttl: Duration,
}

impl ReportCache {
    /// Cache with the standard one-hour lifetime
    pub fn new() -> Self {
        Self::with_ttl(REPORT_TTL)
    }

    /// Cache with a custom lifetime
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Live entry for `ticker`, if any
    pub async fn get(&self, ticker: &Ticker) -> Option<AnalysisReport> {
        let mut entries = self.entries.write().await;
        entries.cache_get(ticker).cloned()
    }

    /// Return the live report for `ticker`, or compute and store a new one
    pub async fn get_or_compute<F, Fut, E>(&self, ticker: &Ticker, compute_fn: F) -> Result<AnalysisReport, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AnalysisReport, E>>,
    {
        if let Some(report) = self.get(ticker).await {
            debug!(ticker = %ticker, "Report cache hit");
            return Ok(report);
        }

        let key_lock = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(in_flight.entry(ticker.clone()).or_default())
        };
        let guard = key_lock.lock().await;

        // Another caller may have filled the entry while we waited.
        let result = if let Some(report) = self.get(ticker).await {
            debug!(ticker = %ticker, "Report cache hit after wait");
            Ok(report)
        } else {
            info!(ticker = %ticker, "Report cache miss, computing");
            match compute_fn().await {
                Ok(report) => {
                    let mut entries = self.entries.write().await;
                    let _ = entries.cache_set(ticker.clone(), report.clone());
                    Ok(report)
                }
                Err(e) => Err(e),
            }
        };

        drop(guard);
        drop(key_lock);
        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(ticker)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            in_flight.remove(ticker);
        }

        result
    }

    /// Number of stored entries, expired ones included until evicted
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}
