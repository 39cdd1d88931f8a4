use thiserror::Error;

/// The fetched page did not contain a usable table literal.
///
/// Usually means the upstream page layout changed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no `return {{ ... }}` table literal found in page ({bytes} bytes)")]
    NotFound { bytes: usize },

    #[error("table literal starting at byte {offset} is never closed")]
    Unterminated { offset: usize },
}

/// A table literal was found but yielded nothing usable.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("table literal produced no valid champion records ({entries} entries inspected)")]
    NoRecords { entries: usize },
}

/// Failure of a single fetch tier. The chain moves on to the next tier.
#[derive(Debug, Error)]
pub enum TierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("bot challenge page served for {url}")]
    Challenge { url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("no relay endpoints configured")]
    NoRelays,

    #[error("headless browser error: {0}")]
    Browser(String),

    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Every fetch tier failed, or the chain could not be built.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("all {attempted} fetch tiers failed for {url}; last tier `{tier}`: {source}")]
    AllTiersFailed {
        url: String,
        attempted: usize,
        tier: &'static str,
        #[source]
        source: TierError,
    },

    #[error("no fetch strategies configured")]
    NoStrategies,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
