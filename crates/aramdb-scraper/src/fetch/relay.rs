use async_trait::async_trait;
use reqwest::Client;

use super::http::get_page;
use super::FetchStrategy;
use crate::error::TierError;

/// Fetches the page through public relay proxies, in configured order.
///
/// Each relay is a URL prefix; the target URL is appended verbatim.
pub struct RelayFetcher {
    client: Client,
    user_agent: String,
    relays: Vec<String>,
}

impl RelayFetcher {
    #[must_use]
    pub fn new(client: Client, user_agent: impl Into<String>, relays: Vec<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            relays,
        }
    }
}

#[async_trait]
impl FetchStrategy for RelayFetcher {
    fn name(&self) -> &'static str {
        "relay"
    }

    async fn fetch(&self, url: &str) -> Result<String, TierError> {
        let mut last_error = TierError::NoRelays;
        for relay in &self.relays {
            let relayed = format!("{relay}{url}");
            match get_page(&self.client, &relayed, &self.user_agent, None, None).await {
                Ok(body) => {
                    tracing::debug!(relay = %relay, "relay fetch succeeded");
                    return Ok(body);
                }
                Err(e) => {
                    tracing::debug!(relay = %relay, error = %e, "relay fetch failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
