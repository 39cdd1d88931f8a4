//! Headless Chrome tier.
//!
//! `headless_chrome` is a blocking API, so every browser interaction runs on
//! the blocking pool. One page is rendered at a time: the browser slot is a
//! plain mutex held for the whole render.

use std::ffi::OsStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};

use aramdb_core::HeadlessConfig;

use super::http::check_body;
use super::FetchStrategy;
use crate::error::TierError;

const EDIT_TEXTAREA: &str = "textarea#wpTextbox1";
const ELEMENT_WAIT: Duration = Duration::from_secs(10);
const WINDOW_SIZE: (u32, u32) = (1920, 1080);

/// Renders the page in a real browser and returns the resulting HTML.
pub struct HeadlessFetcher {
    config: HeadlessConfig,
    user_agent: String,
    browser: Arc<Mutex<Option<Browser>>>,
}

impl HeadlessFetcher {
    #[must_use]
    pub fn new(config: HeadlessConfig, user_agent: impl Into<String>) -> Self {
        Self {
            config,
            user_agent: user_agent.into(),
            browser: Arc::new(Mutex::new(None)),
        }
    }

    /// Launches the browser if needed and queries its version.
    ///
    /// # Errors
    ///
    /// Returns [`TierError::Browser`] if Chrome cannot be started or does
    /// not answer.
    pub async fn health_check(&self) -> Result<String, TierError> {
        let slot = Arc::clone(&self.browser);
        let keep_alive = self.config.keep_alive;
        run_blocking(move || {
            let mut guard = lock(&slot)?;
            let browser = match guard.take() {
                Some(browser) => browser,
                None => launch()?,
            };
            let version = browser
                .get_version()
                .map_err(|e| TierError::Browser(format!("version query failed: {e}")))?;
            if keep_alive {
                *guard = Some(browser);
            }
            Ok(version.product)
        })
        .await
    }

    fn render_blocking(
        slot: &Mutex<Option<Browser>>,
        url: &str,
        config: &HeadlessConfig,
        user_agent: &str,
    ) -> Result<String, TierError> {
        let mut guard = lock(slot)?;
        let browser = match guard.take() {
            Some(browser) => browser,
            None => launch()?,
        };

        let result = render_page(&browser, url, config, user_agent);
        if config.keep_alive && result.is_ok() {
            *guard = Some(browser);
        }
        result
    }
}

#[async_trait]
impl FetchStrategy for HeadlessFetcher {
    fn name(&self) -> &'static str {
        "headless"
    }

    /// A render that outlives the tier timeout is abandoned, not cancelled:
    /// it keeps running on the blocking pool and holds the browser slot until
    /// its own tab waits give up, so the next headless fetch queues behind it.
    /// The tab timeout is derived from the tier timeout to keep that window
    /// short.
    async fn fetch(&self, url: &str) -> Result<String, TierError> {
        let slot = Arc::clone(&self.browser);
        let config = self.config.clone();
        let user_agent = self.user_agent.clone();
        let target = url.to_owned();
        let secs = self.config.timeout_secs;

        let render = run_blocking(move || {
            HeadlessFetcher::render_blocking(&slot, &target, &config, &user_agent)
        });
        let html = tokio::time::timeout(Duration::from_secs(secs), render)
            .await
            .map_err(|_| TierError::Timeout { secs })??;

        check_body(url, html)
    }

    /// Launches the browser up front when it is kept alive between fetches.
    /// Otherwise it starts lazily on the first render.
    async fn start(&self) -> Result<(), TierError> {
        if !self.config.keep_alive {
            return Ok(());
        }
        let slot = Arc::clone(&self.browser);
        run_blocking(move || {
            let mut guard = lock(&slot)?;
            if guard.is_none() {
                *guard = Some(launch()?);
                tracing::info!("headless browser started");
            }
            Ok(())
        })
        .await
    }

    async fn shutdown(&self) {
        let slot = Arc::clone(&self.browser);
        let result = run_blocking(move || {
            let browser = lock(&slot)?.take();
            if browser.is_some() {
                tracing::info!("headless browser shut down");
            }
            drop(browser);
            Ok(())
        })
        .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "headless browser shutdown failed");
        }
    }
}

fn launch() -> Result<Browser, TierError> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some(WINDOW_SIZE))
        .args(vec![OsStr::new("--disable-dev-shm-usage")])
        .build()
        .map_err(|e| TierError::Browser(format!("invalid launch options: {e}")))?;

    Browser::new(options).map_err(|e| TierError::Browser(format!("failed to launch Chrome: {e}")))
}

fn render_page(
    browser: &Browser,
    url: &str,
    config: &HeadlessConfig,
    user_agent: &str,
) -> Result<String, TierError> {
    let tab = browser
        .new_tab()
        .map_err(|e| TierError::Browser(format!("new tab: {e}")))?;
    tab.set_default_timeout(tab_timeout(config));
    tab.set_user_agent(user_agent, Some("en-US,en"), None)
        .map_err(|e| TierError::Browser(format!("set user agent: {e}")))?;
    tab.navigate_to(url)
        .map_err(|e| TierError::Browser(format!("navigate: {e}")))?;
    tab.wait_until_navigated()
        .map_err(|e| TierError::Browser(format!("wait for load: {e}")))?;

    std::thread::sleep(Duration::from_millis(config.settle_ms));

    tab.wait_for_element_with_custom_timeout(EDIT_TEXTAREA, ELEMENT_WAIT)
        .map_err(|e| TierError::Browser(format!("wait for {EDIT_TEXTAREA}: {e}")))?;
    let html = tab
        .get_content()
        .map_err(|e| TierError::Browser(format!("read content: {e}")))?;

    if let Err(e) = tab.close(true) {
        tracing::debug!(error = %e, "failed to close browser tab");
    }
    Ok(html)
}

/// Budget for each tab wait: whatever the tier timeout leaves after the
/// settle delay and the editor wait, but never under one second.
fn tab_timeout(config: &HeadlessConfig) -> Duration {
    Duration::from_secs(config.timeout_secs)
        .saturating_sub(Duration::from_millis(config.settle_ms))
        .saturating_sub(ELEMENT_WAIT)
        .max(Duration::from_secs(1))
}

fn lock(slot: &Mutex<Option<Browser>>) -> Result<MutexGuard<'_, Option<Browser>>, TierError> {
    slot.lock()
        .map_err(|_| TierError::Browser("browser mutex poisoned".to_owned()))
}

async fn run_blocking<T, F>(task: F) -> Result<T, TierError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, TierError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| TierError::Browser(format!("blocking task failed: {e}")))?
}
