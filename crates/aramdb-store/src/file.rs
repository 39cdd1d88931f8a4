use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::entry::CacheEntry;
use crate::error::CacheStoreError;
use crate::CacheStore;

/// Stores the entry as pretty-printed JSON in a local file.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never sees a half-written entry.
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CacheStoreError {
        CacheStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Result<Option<CacheEntry>, CacheStoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let entry = serde_json::from_str(&text).map_err(|source| CacheStoreError::Json {
            context: self.path.display().to_string(),
            source,
        })?;
        Ok(Some(entry))
    }

    async fn save(&self, entry: &CacheEntry) -> Result<(), CacheStoreError> {
        let json = serde_json::to_string_pretty(entry).map_err(|source| CacheStoreError::Json {
            context: self.path.display().to_string(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "wrote cache file");
        Ok(())
    }

    async fn health(&self) -> Result<(), CacheStoreError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) if !parent.exists() => Err(self.io_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cache directory does not exist",
            ))),
            _ => Ok(()),
        }
    }
}
