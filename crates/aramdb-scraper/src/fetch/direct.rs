use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use aramdb_core::WikiConfig;

use super::http::{browser_headers, get_page};
use super::session::{cookie_header_from, SessionCookies};
use super::FetchStrategy;
use crate::error::TierError;

/// Fetches the page directly, looking like a returning browser session.
///
/// Session cookies come from a bootstrap request to a related page and are
/// reused until they expire. An operator-supplied cookie replaces bootstrap.
pub struct DirectFetcher {
    client: Client,
    user_agent: String,
    bootstrap_url: String,
    cookie_override: Option<String>,
    cookies: SessionCookies,
}

impl DirectFetcher {
    #[must_use]
    pub fn new(client: Client, config: &WikiConfig) -> Self {
        Self {
            client,
            user_agent: config.user_agent.clone(),
            bootstrap_url: config.bootstrap_url.clone(),
            cookie_override: config.cookie_override.clone(),
            cookies: SessionCookies::new(Duration::from_secs(config.cookie_ttl_secs)),
        }
    }

    async fn session_cookie(&self) -> Option<String> {
        if let Some(cookie) = &self.cookie_override {
            return Some(cookie.clone());
        }
        self.cookies.get_or_bootstrap(|| self.bootstrap()).await
    }

    async fn bootstrap(&self) -> Option<String> {
        let response = match self
            .client
            .get(&self.bootstrap_url)
            .headers(browser_headers(&self.user_agent))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    url = %self.bootstrap_url,
                    error = %e,
                    "cookie bootstrap failed; continuing without cookies"
                );
                return None;
            }
        };

        let cookie = cookie_header_from(response.headers());
        match &cookie {
            Some(_) => tracing::debug!(url = %self.bootstrap_url, "session cookies bootstrapped"),
            None => tracing::debug!(
                url = %self.bootstrap_url,
                status = response.status().as_u16(),
                "bootstrap response set no cookies"
            ),
        }
        cookie
    }
}

#[async_trait]
impl FetchStrategy for DirectFetcher {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str) -> Result<String, TierError> {
        let cookie = self.session_cookie().await;
        let result = get_page(
            &self.client,
            url,
            &self.user_agent,
            cookie.as_deref(),
            Some(&self.bootstrap_url),
        )
        .await;

        if let Err(TierError::UnexpectedStatus {
            status: 401 | 403, ..
        }) = &result
        {
            if self.cookie_override.is_none() {
                self.cookies.invalidate().await;
            }
        }
        result
    }
}
