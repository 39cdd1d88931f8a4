use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use aramdb_core::{AppConfig, FetchResult, Origin, StoreConfig};
use aramdb_scraper::{extract_source_version, extract_table, parse_champion_data, FetchChain};
use aramdb_store::{CacheEntry, CacheStore, CacheStoreError, FileCacheStore, HttpCacheStore};

use crate::error::{AcquisitionError, RefreshError, SetupError};

/// Snapshot of where the service stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// No entry loaded and no refresh attempted yet.
    Cold,
    /// Entry younger than the max age.
    Fresh,
    /// Entry older than the max age.
    Stale,
    /// A refresh is in flight.
    Refreshing,
    /// The last refresh failed and there is no entry to fall back on.
    Error,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ServiceState::Cold => "cold",
            ServiceState::Fresh => "fresh",
            ServiceState::Stale => "stale",
            ServiceState::Refreshing => "refreshing",
            ServiceState::Error => "error",
        };
        f.write_str(label)
    }
}

/// Long-lived, shared by handle. Owns the in-process current result; the
/// cache store is the source of truth across restarts.
pub struct AcquisitionService {
    chain: FetchChain,
    store: Arc<dyn CacheStore>,
    source_url: String,
    max_age_ms: i64,
    current: RwLock<Option<FetchResult>>,
    refresh_lock: Mutex<()>,
    refreshing: AtomicBool,
    failed: AtomicBool,
}

impl AcquisitionService {
    #[must_use]
    pub fn new(
        chain: FetchChain,
        store: Arc<dyn CacheStore>,
        source_url: impl Into<String>,
        max_age: Duration,
    ) -> Self {
        Self {
            chain,
            store,
            source_url: source_url.into(),
            max_age_ms: i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX),
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refreshing: AtomicBool::new(false),
            failed: AtomicBool::new(false),
        }
    }

    /// Builds the standard fetch chain and cache store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the HTTP clients cannot be built or the
    /// store URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, SetupError> {
        let chain = FetchChain::from_config(&config.wiki, &config.headless)?;
        let store = build_store(&config.store, config.wiki.request_timeout_secs)?;
        tracing::info!(
            tiers = ?chain.tier_names(),
            store = %store.describe(),
            max_age_secs = config.cache_max_age_secs,
            "acquisition service configured"
        );
        Ok(Self::new(
            chain,
            store,
            config.wiki.url.clone(),
            Duration::from_secs(config.cache_max_age_secs),
        ))
    }

    /// Freshness-aware read.
    ///
    /// A fresh entry is returned as-is with `origin = cache`. A stale or
    /// missing entry triggers a refresh. While another refresh is in flight,
    /// a caller that has a previous entry gets it immediately; a cold caller
    /// waits for that refresh and reads again.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Unavailable`] only when the refresh failed
    /// and no entry of any age exists.
    pub async fn read(&self) -> Result<FetchResult, AcquisitionError> {
        if let Some(fresh) = self.fresh_current().await {
            return Ok(fresh.with_origin(Origin::Cache));
        }

        self.sync_from_store().await;
        if let Some(fresh) = self.fresh_current().await {
            return Ok(fresh.with_origin(Origin::Cache));
        }

        let guard = if let Ok(guard) = self.refresh_lock.try_lock() {
            guard
        } else {
            if let Some(previous) = self.snapshot().await {
                tracing::debug!("refresh in flight; serving previous entry");
                return Ok(previous.with_origin(Origin::Cache));
            }
            let guard = self.refresh_lock.lock().await;
            if let Some(current) = self.snapshot().await {
                return Ok(current.with_origin(Origin::Cache));
            }
            guard
        };

        self.refresh_with(guard).await
    }

    /// Runs the full pipeline regardless of freshness.
    ///
    /// Waits for an in-flight refresh to finish first. Falls back to the
    /// previous entry on failure, like [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Unavailable`] when the refresh failed and
    /// no entry of any age exists.
    pub async fn force_refresh(&self) -> Result<FetchResult, AcquisitionError> {
        self.sync_from_store().await;
        let guard = self.refresh_lock.lock().await;
        self.refresh_with(guard).await
    }

    /// Cache-only read. Never fetches.
    pub async fn cached(&self) -> Option<FetchResult> {
        self.sync_from_store().await;
        self.snapshot()
            .await
            .map(|result| result.with_origin(Origin::Cache))
    }

    /// Milliseconds since the cached entry was written, without fetching.
    pub async fn data_age(&self) -> Option<i64> {
        self.cached()
            .await
            .map(|result| result.age_ms(Utc::now()))
    }

    pub async fn state(&self) -> ServiceState {
        if self.refreshing.load(Ordering::SeqCst) {
            return ServiceState::Refreshing;
        }
        match self.current.read().await.as_ref() {
            Some(result) if self.is_fresh(result) => ServiceState::Fresh,
            Some(_) => ServiceState::Stale,
            None if self.failed.load(Ordering::SeqCst) => ServiceState::Error,
            None => ServiceState::Cold,
        }
    }

    /// Checks that the cache store is reachable.
    ///
    /// # Errors
    ///
    /// Returns the store's error when it is not.
    pub async fn store_health(&self) -> Result<(), CacheStoreError> {
        self.store.health().await
    }

    #[must_use]
    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    /// Acquires long-lived fetch resources up front, such as a kept-alive
    /// browser. Failures are logged; the tier then starts on first use.
    pub async fn start(&self) {
        self.chain.start().await;
    }

    /// Releases long-lived fetch resources such as a kept-alive browser.
    pub async fn shutdown(&self) {
        self.chain.shutdown().await;
        tracing::info!("acquisition service shut down");
    }

    async fn refresh_with(&self, _guard: MutexGuard<'_, ()>) -> Result<FetchResult, AcquisitionError> {
        let outcome = {
            let _flag = RefreshingFlag::raise(&self.refreshing);
            self.run_pipeline().await
        };

        match outcome {
            Ok(result) => {
                self.persist(&result).await;
                self.failed.store(false, Ordering::SeqCst);
                *self.current.write().await = Some(result.clone());
                Ok(result)
            }
            Err(e) => match self.snapshot().await {
                Some(previous) => {
                    tracing::error!(
                        error = %e,
                        age_ms = previous.age_ms(Utc::now()),
                        "refresh failed; serving previous entry"
                    );
                    Ok(previous.with_origin(Origin::StaleFallback))
                }
                None => {
                    tracing::error!(error = %e, "refresh failed with no cached entry");
                    self.failed.store(true, Ordering::SeqCst);
                    Err(AcquisitionError::Unavailable(e))
                }
            },
        }
    }

    async fn run_pipeline(&self) -> Result<FetchResult, RefreshError> {
        let html = self.chain.fetch(&self.source_url).await?;
        let literal = extract_table(&html)?;
        let records = parse_champion_data(&literal)?;
        let source_version = extract_source_version(&html);

        tracing::info!(
            champions = records.len(),
            source_version = source_version.as_deref().unwrap_or("unknown"),
            "refresh succeeded"
        );

        Ok(FetchResult {
            records,
            fetched_at: Utc::now(),
            source_version,
            origin: Origin::Fresh,
        })
    }

    async fn persist(&self, result: &FetchResult) {
        if result.records.is_empty() {
            return;
        }
        if let Err(e) = self.store.save(&CacheEntry::from_result(result)).await {
            tracing::warn!(
                store = %self.store.describe(),
                error = %e,
                "failed to persist cache entry"
            );
        }
    }

    /// Adopts the stored entry when it is newer than the in-process one.
    async fn sync_from_store(&self) {
        let entry = match self.store.load().await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    store = %self.store.describe(),
                    error = %e,
                    "failed to read cache entry; treating as missing"
                );
                None
            }
        };
        let Some(entry) = entry.filter(|entry| !entry.data.is_empty()) else {
            return;
        };

        let mut current = self.current.write().await;
        let is_newer = current
            .as_ref()
            .is_none_or(|existing| entry.fetched_at() > existing.fetched_at);
        if is_newer {
            tracing::debug!(timestamp = entry.timestamp, "loaded cache entry from store");
            *current = Some(entry.into_result(Origin::Cache));
        }
    }

    async fn snapshot(&self) -> Option<FetchResult> {
        self.current.read().await.clone()
    }

    async fn fresh_current(&self) -> Option<FetchResult> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|result| self.is_fresh(result))
            .cloned()
    }

    fn is_fresh(&self, result: &FetchResult) -> bool {
        result.age_ms(Utc::now()) <= self.max_age_ms
    }
}

/// Clears the refreshing flag on drop, including when the refresh future is
/// cancelled.
struct RefreshingFlag<'a>(&'a AtomicBool);

impl<'a> RefreshingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Picks the cache store backend: a local file when one is configured,
/// otherwise the HTTP record store.
///
/// # Errors
///
/// Returns [`CacheStoreError`] if the HTTP store client cannot be built.
pub fn build_store(
    config: &StoreConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn CacheStore>, CacheStoreError> {
    match &config.cache_file {
        Some(path) => Ok(Arc::new(FileCacheStore::new(path.clone()))),
        None => Ok(Arc::new(HttpCacheStore::new(config, timeout_secs)?)),
    }
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
