use thiserror::Error;

use aramdb_scraper::{ExtractionError, FetchError, ParseError};
use aramdb_store::CacheStoreError;

/// One refresh attempt failed somewhere in fetch, extract or parse.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
}

/// Surfaced to callers only when a refresh failed and no cached entry of
/// any age exists.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("no champion data available: {0}")]
    Unavailable(#[source] RefreshError),
}

/// The service could not be assembled from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to build fetch chain: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to build cache store: {0}")]
    Store(#[from] CacheStoreError),
}
