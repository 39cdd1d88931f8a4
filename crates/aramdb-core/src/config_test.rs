use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_accepts_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("Production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_rejects_unknown_value() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ARAMDB_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.cache_max_age_secs, 86_400);
    assert_eq!(cfg.wiki.url, DEFAULT_WIKI_URL);
    assert_eq!(
        cfg.wiki.bootstrap_url,
        "https://leagueoflegends.fandom.com/wiki/Module:ChampionData/data"
    );
    assert!(cfg.wiki.cookie_override.is_none());
    assert_eq!(cfg.wiki.relay_urls.len(), 3);
    assert_eq!(cfg.wiki.request_timeout_secs, 30);
    assert_eq!(cfg.wiki.cookie_ttl_secs, 1_800);
    assert!(cfg.headless.enabled);
    assert!(!cfg.headless.keep_alive);
    assert_eq!(cfg.headless.timeout_secs, 45);
    assert_eq!(cfg.headless.settle_ms, 3_000);
    assert_eq!(cfg.store.collection, "data");
    assert_eq!(cfg.store.record_id, "latestaramdata1");
    assert!(cfg.store.token.is_none());
    assert!(cfg.store.cache_file.is_none());
}

#[test]
fn empty_relay_list_disables_relays() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_RELAY_URLS", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.wiki.relay_urls.is_empty());
}

#[test]
fn relay_list_is_trimmed_and_split() {
    let mut map = HashMap::new();
    map.insert(
        "ARAMDB_RELAY_URLS",
        " https://relay.one/?url= , ,https://relay.two/",
    );
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.wiki.relay_urls,
        vec!["https://relay.one/?url=", "https://relay.two/"]
    );
}

#[test]
fn store_token_falls_back_to_legacy_names() {
    let mut map = HashMap::new();
    map.insert("PB_TOKEN", "legacy-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.store.token.as_deref(), Some("legacy-token"));

    map.insert("ARAMDB_STORE_TOKEN", "primary-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.store.token.as_deref(), Some("primary-token"));
}

#[test]
fn blank_cookie_override_is_ignored() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_WIKI_COOKIE", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.wiki.cookie_override.is_none());
}

#[test]
fn explicit_bootstrap_url_wins_over_derived() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_WIKI_BOOTSTRAP_URL", "https://wiki.example/Main_Page");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.wiki.bootstrap_url, "https://wiki.example/Main_Page");
}

#[test]
fn invalid_timeout_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARAMDB_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(ARAMDB_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn invalid_headless_flag_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_HEADLESS_ENABLED", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARAMDB_HEADLESS_ENABLED"),
        "expected InvalidEnvVar(ARAMDB_HEADLESS_ENABLED), got: {result:?}"
    );
}

#[test]
fn non_http_wiki_url_is_rejected() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_WIKI_URL", "ftp://wiki.example/data");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ARAMDB_WIKI_URL"));
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("ARAMDB_STORE_TOKEN", "super-secret");
    map.insert("ARAMDB_WIKI_COOKIE", "session=abc123");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(!rendered.contains("abc123"));
    assert!(rendered.contains("[redacted]"));
}
