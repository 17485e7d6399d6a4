//! Domain → analysis cache with expiry.
//!
//! The whole cache is one `cachedResults` document (a map keyed by domain),
//! so there is at most one entry per domain by construction. Reads and
//! writes of that document are serialized by a lock held across each
//! read-modify-write.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::Mutex;

use super::documents::{DocumentStore, CACHED_RESULTS_KEY};
use crate::error_handling::{ErrorType, InfoType, PipelineStats};
use crate::models::{AnalysisResult, CachedAnalysis};
use crate::utils::Clock;

type CacheDocument = BTreeMap<String, CachedAnalysis>;

pub struct ResultCache {
    store: DocumentStore,
    clock: Arc<dyn Clock>,
    stats: Arc<PipelineStats>,
    lock: Mutex<()>,
}

impl ResultCache {
    pub fn new(store: DocumentStore, clock: Arc<dyn Clock>, stats: Arc<PipelineStats>) -> Self {
        Self {
            store,
            clock,
            stats,
            lock: Mutex::new(()),
        }
    }

    /// Read failures degrade to an empty cache.
    async fn load(&self) -> CacheDocument {
        match self.store.get::<CacheDocument>(CACHED_RESULTS_KEY).await {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                log::warn!("Failed to read result cache, treating as empty: {}", e);
                self.stats.increment_error(ErrorType::StorageReadError);
                CacheDocument::new()
            }
        }
    }

    async fn save(&self, doc: &CacheDocument) -> bool {
        match self.store.set(CACHED_RESULTS_KEY, doc).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write result cache: {}", e);
                self.stats.increment_error(ErrorType::StorageWriteError);
                false
            }
        }
    }

    /// Returns the live entry for `domain`.
    ///
    /// An expired entry is removed from the durable store before `None` is
    /// returned, so later reads don't see it either.
    pub async fn get(&self, domain: &str) -> Option<CachedAnalysis> {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await;
        let now = self.clock.now();

        match doc.get(domain) {
            Some(entry) if entry.is_expired(now) => {
                log::debug!("Evicting expired cache entry for {}", domain);
                doc.remove(domain);
                self.save(&doc).await;
                self.stats.increment_info(InfoType::CacheEviction);
                self.stats.increment_info(InfoType::CacheMiss);
                None
            }
            Some(entry) => {
                self.stats.increment_info(InfoType::CacheHit);
                Some(entry.clone())
            }
            None => {
                self.stats.increment_info(InfoType::CacheMiss);
                None
            }
        }
    }

    /// Stores `result` for `domain`, replacing any existing entry.
    pub async fn put(&self, domain: &str, result: AnalysisResult, ttl_hours: u32) -> CachedAnalysis {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await;
        let ttl = Duration::hours(i64::from(ttl_hours.max(1)));
        let entry = CachedAnalysis::new(result, self.clock.now(), ttl);
        doc.insert(domain.to_string(), entry.clone());
        self.save(&doc).await;
        entry
    }

    /// Replaces the stored result for its domain, keeping `cachedAt` and
    /// `expiresAt`. Only applies while the entry still holds a result with the
    /// same id and has not expired; returns whether it was applied.
    pub async fn update_result(&self, result: &AnalysisResult) -> bool {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await;
        let now = self.clock.now();

        let Some(entry) = doc.get_mut(&result.domain) else {
            return false;
        };
        if entry.result.id != result.id || entry.is_expired(now) {
            return false;
        }
        entry.result = result.clone();
        self.save(&doc).await
    }

    pub async fn clear(&self) {
        let _guard = self.lock.lock().await;
        if let Err(e) = self.store.remove(CACHED_RESULTS_KEY).await {
            log::error!("Failed to clear result cache: {}", e);
            self.stats.increment_error(ErrorType::StorageWriteError);
        }
    }

    /// Removes every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await;
        let now = self.clock.now();
        let before = doc.len();
        doc.retain(|_, entry| !entry.is_expired(now));
        let purged = before - doc.len();
        if purged > 0 {
            self.save(&doc).await;
            for _ in 0..purged {
                self.stats.increment_info(InfoType::CacheEviction);
            }
            log::info!("Purged {} expired cache entries", purged);
        }
        purged
    }

    /// All stored entries, live or not, keyed by domain.
    pub async fn entries(&self) -> Vec<(String, CachedAnalysis)> {
        let _guard = self.lock.lock().await;
        self.load().await.into_iter().collect()
    }
}
