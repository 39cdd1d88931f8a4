//! Durable storage for the latest parsed champion dataset.
//!
//! One well-known record holds the newest [`CacheEntry`]. It is created on
//! the first successful parse, overwritten on every later one, and never
//! deleted here.

pub mod entry;
pub mod error;
pub mod file;
pub mod http;
pub mod memory;

use async_trait::async_trait;

pub use entry::CacheEntry;
pub use error::CacheStoreError;
pub use file::FileCacheStore;
pub use http::{HttpCacheStore, RecordSummary};
pub use memory::MemoryCacheStore;

/// Get-by-id and upsert access to the cached dataset.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Human-readable location, for logs.
    fn describe(&self) -> String;

    /// The stored entry, or `None` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<CacheEntry>, CacheStoreError>;

    /// Creates or overwrites the stored entry.
    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheStoreError>;

    /// Checks that the backing store is reachable.
    async fn health(&self) -> Result<(), CacheStoreError> {
        Ok(())
    }
}
