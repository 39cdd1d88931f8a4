use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aramdb_core::{ChampionData, FetchResult, Origin};

/// Stored form of a [`FetchResult`].
///
/// Wire shape is `{ data, patchVersion, timestamp }` with `timestamp` in
/// epoch milliseconds, shared by the record store and the local file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: ChampionData,
    #[serde(
        rename = "patchVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub patch_version: Option<String>,
    pub timestamp: i64,
}

impl CacheEntry {
    #[must_use]
    pub fn from_result(result: &FetchResult) -> Self {
        Self {
            data: result.records.clone(),
            patch_version: result.source_version.clone(),
            timestamp: result.fetched_at.timestamp_millis(),
        }
    }

    /// Fetch time of this entry. Out-of-range timestamps map to the epoch.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Milliseconds since the entry was written, floored at zero.
    #[must_use]
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now.timestamp_millis() - self.timestamp).max(0)
    }

    #[must_use]
    pub fn into_result(self, origin: Origin) -> FetchResult {
        FetchResult {
            fetched_at: self.fetched_at(),
            records: self.data,
            source_version: self.patch_version,
            origin,
        }
    }
}
