use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entry::CacheEntry;
use crate::error::CacheStoreError;
use crate::CacheStore;

/// Process-local store. Used for dry runs and tests; nothing survives a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            entry: RwLock::new(Some(entry)),
        }
    }

    pub async fn snapshot(&self) -> Option<CacheEntry> {
        self.entry.read().await.clone()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn describe(&self) -> String {
        "memory".to_owned()
    }

    async fn load(&self) -> Result<Option<CacheEntry>, CacheStoreError> {
        Ok(self.snapshot().await)
    }

    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheStoreError> {
        *self.entry.write().await = Some(entry.clone());
        Ok(())
    }
}
