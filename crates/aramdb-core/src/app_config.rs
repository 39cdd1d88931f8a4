use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Upstream wiki and the direct/relay fetch tiers.
#[derive(Clone)]
pub struct WikiConfig {
    pub url: String,
    /// Page requested to obtain session cookies before the real fetch.
    pub bootstrap_url: String,
    /// Raw `Cookie` header value that replaces bootstrap entirely.
    pub cookie_override: Option<String>,
    /// Relay prefixes; the target URL is appended verbatim.
    pub relay_urls: Vec<String>,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub cookie_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub enabled: bool,
    /// Keep the browser process alive between fetches.
    pub keep_alive: bool,
    pub timeout_secs: u64,
    pub settle_ms: u64,
}

#[derive(Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub collection: String,
    pub record_id: String,
    /// When set, a local JSON file replaces the HTTP record store.
    pub cache_file: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub cache_max_age_secs: u64,
    pub wiki: WikiConfig,
    pub headless: HeadlessConfig,
    pub store: StoreConfig,
}

impl std::fmt::Debug for WikiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiConfig")
            .field("url", &self.url)
            .field("bootstrap_url", &self.bootstrap_url)
            .field(
                "cookie_override",
                &self.cookie_override.as_ref().map(|_| "[redacted]"),
            )
            .field("relay_urls", &self.relay_urls)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cookie_ttl_secs", &self.cookie_ttl_secs)
            .finish()
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .field("collection", &self.collection)
            .field("record_id", &self.record_id)
            .field("cache_file", &self.cache_file)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("cache_max_age_secs", &self.cache_max_age_secs)
            .field("wiki", &self.wiki)
            .field("headless", &self.headless)
            .field("store", &self.store)
            .finish()
    }
}
