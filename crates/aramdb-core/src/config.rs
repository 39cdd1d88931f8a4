use crate::app_config::{AppConfig, Environment, HeadlessConfig, StoreConfig, WikiConfig};
use crate::ConfigError;

pub const DEFAULT_WIKI_URL: &str =
    "https://leagueoflegends.fandom.com/wiki/Module:ChampionData/data?action=edit";

pub const DEFAULT_RELAY_URLS: &str =
    "https://corsproxy.io/?,https://api.allorigins.win/raw?url=,https://proxy.cors.sh/";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:144.0) Gecko/20100101 Firefox/144.0";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw)
                .ok_or_else(|| invalid(var, format!("expected a boolean, got \"{raw}\""))),
        }
    };

    let env = parse_environment(&or_default("ARAMDB_ENV", "development"))?;

    let bind_addr = or_default("ARAMDB_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("ARAMDB_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("ARAMDB_LOG_LEVEL", "info");
    let cache_max_age_secs = parse_u64("ARAMDB_CACHE_MAX_AGE_SECS", "86400")?;

    let wiki_url = or_default("ARAMDB_WIKI_URL", DEFAULT_WIKI_URL);
    if !wiki_url.starts_with("http://") && !wiki_url.starts_with("https://") {
        return Err(invalid(
            "ARAMDB_WIKI_URL",
            format!("\"{wiki_url}\" is not an http(s) URL"),
        ));
    }
    let bootstrap_url =
        optional("ARAMDB_WIKI_BOOTSTRAP_URL").unwrap_or_else(|| derive_bootstrap_url(&wiki_url));

    let wiki = WikiConfig {
        bootstrap_url,
        cookie_override: optional("ARAMDB_WIKI_COOKIE"),
        relay_urls: parse_list(&or_default("ARAMDB_RELAY_URLS", DEFAULT_RELAY_URLS)),
        user_agent: or_default("ARAMDB_USER_AGENT", DEFAULT_USER_AGENT),
        request_timeout_secs: parse_u64("ARAMDB_REQUEST_TIMEOUT_SECS", "30")?,
        cookie_ttl_secs: parse_u64("ARAMDB_COOKIE_TTL_SECS", "1800")?,
        url: wiki_url,
    };

    let headless = HeadlessConfig {
        enabled: parse_bool("ARAMDB_HEADLESS_ENABLED", true)?,
        keep_alive: parse_bool("ARAMDB_HEADLESS_KEEP_ALIVE", false)?,
        timeout_secs: parse_u64("ARAMDB_HEADLESS_TIMEOUT_SECS", "45")?,
        settle_ms: parse_u64("ARAMDB_HEADLESS_SETTLE_MS", "3000")?,
    };

    let token = optional("ARAMDB_STORE_TOKEN")
        .or_else(|| optional("POCKETBASE_TOKEN"))
        .or_else(|| optional("PB_TOKEN"));

    let store = StoreConfig {
        base_url: or_default("ARAMDB_STORE_URL", "http://127.0.0.1:8090"),
        token,
        collection: or_default("ARAMDB_STORE_COLLECTION", "data"),
        record_id: or_default("ARAMDB_STORE_RECORD_ID", "latestaramdata1"),
        cache_file: optional("ARAMDB_CACHE_FILE").map(PathBuf::from),
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        cache_max_age_secs,
        wiki,
        headless,
        store,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ARAMDB_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Comma-separated list with blanks dropped. An empty string yields an empty list.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// The wiki serves session cookies on the plain view of the same page.
fn derive_bootstrap_url(wiki_url: &str) -> String {
    wiki_url
        .split_once('?')
        .map_or(wiki_url, |(base, _)| base)
        .to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
