//! Ordered fetch tiers for the wiki page.
//!
//! Each tier is a [`FetchStrategy`]. [`FetchChain`] tries them in order and
//! returns the first usable body; a tier failure is logged and the next tier
//! runs. Adding or removing a tier is an edit to the list built in
//! [`FetchChain::from_config`].

mod direct;
mod headless;
mod http;
mod relay;
mod session;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use aramdb_core::{HeadlessConfig, WikiConfig};

use crate::error::{FetchError, TierError};

pub use direct::DirectFetcher;
pub use headless::HeadlessFetcher;
pub use relay::RelayFetcher;
pub use session::SessionCookies;

/// One way of getting the raw page text.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short tier name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<String, TierError>;

    /// Acquires long-lived resources ahead of the first fetch. Most tiers
    /// hold none.
    async fn start(&self) -> Result<(), TierError> {
        Ok(())
    }

    /// Releases long-lived resources. Most tiers hold none.
    async fn shutdown(&self) {}
}

pub struct FetchChain {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl FetchChain {
    #[must_use]
    pub fn new(strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        Self { strategies }
    }

    /// Builds the standard chain: direct, then relays (if any are
    /// configured), then headless (if enabled). Direct and relay share one
    /// HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    pub fn from_config(wiki: &WikiConfig, headless: &HeadlessConfig) -> Result<Self, FetchError> {
        let client = build_client(wiki.request_timeout_secs).map_err(FetchError::Client)?;

        let mut strategies: Vec<Box<dyn FetchStrategy>> =
            vec![Box::new(DirectFetcher::new(client.clone(), wiki))];
        if !wiki.relay_urls.is_empty() {
            strategies.push(Box::new(RelayFetcher::new(
                client,
                wiki.user_agent.clone(),
                wiki.relay_urls.clone(),
            )));
        }
        if headless.enabled {
            strategies.push(Box::new(HeadlessFetcher::new(
                headless.clone(),
                wiki.user_agent.clone(),
            )));
        }

        Ok(Self::new(strategies))
    }

    #[must_use]
    pub fn tier_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Returns the body from the first tier that succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AllTiersFailed`] carrying the last tier's error
    /// when every tier fails, or [`FetchError::NoStrategies`] for an empty
    /// chain.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut last: Option<(&'static str, TierError)> = None;

        for strategy in &self.strategies {
            let tier = strategy.name();
            match strategy.fetch(url).await {
                Ok(body) => {
                    tracing::info!(tier, bytes = body.len(), "fetched wiki page");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::warn!(tier, url, error = %e, "fetch tier failed; trying next");
                    last = Some((tier, e));
                }
            }
        }

        match last {
            Some((tier, source)) => Err(FetchError::AllTiersFailed {
                url: url.to_owned(),
                attempted: self.strategies.len(),
                tier,
                source,
            }),
            None => Err(FetchError::NoStrategies),
        }
    }

    /// Starts every tier. A tier that fails to start is logged and left to
    /// start lazily on its first fetch.
    pub async fn start(&self) {
        for strategy in &self.strategies {
            if let Err(e) = strategy.start().await {
                tracing::warn!(tier = strategy.name(), error = %e, "fetch tier failed to start");
            }
        }
    }

    /// Shuts down every tier, in order.
    pub async fn shutdown(&self) {
        for strategy in &self.strategies {
            strategy.shutdown().await;
        }
    }
}

fn build_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()
}
