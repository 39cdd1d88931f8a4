//! Command handlers for the CLI.
//!
//! `refresh` and `show` go through [`AcquisitionService`] so they honor the
//! same cache store as the server; `parse-file` runs the extract and parse
//! stages on local input only.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use aramdb_acquisition::AcquisitionService;
use aramdb_core::{AppConfig, ChampionData, ChampionRecord, FetchResult, GameMode};
use aramdb_scraper::{
    extract_source_version, extract_table, parse_champion_data, FetchChain, FetchStrategy,
    HeadlessFetcher,
};
use aramdb_store::{HttpCacheStore, MemoryCacheStore, RecordSummary};

pub(crate) struct ShowOptions {
    pub mode: GameMode,
    pub champion: Option<String>,
    pub modified_only: bool,
    pub cached: bool,
    pub json: bool,
}

pub(crate) async fn run_refresh(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let service = if dry_run {
        let chain = FetchChain::from_config(&config.wiki, &config.headless)?;
        AcquisitionService::new(
            chain,
            Arc::new(MemoryCacheStore::new()),
            config.wiki.url.clone(),
            Duration::from_secs(config.cache_max_age_secs),
        )
    } else {
        AcquisitionService::from_config(config)?
    };

    tracing::info!(dry_run, store = %service.store_description(), "starting manual refresh");
    let outcome = service.force_refresh().await;
    service.shutdown().await;
    let result = outcome?;

    println!(
        "{} champions, patch {}, origin {}{}",
        result.champions_count(),
        result.source_version.as_deref().unwrap_or("unknown"),
        result.origin,
        if dry_run { " (dry run, not stored)" } else { "" },
    );
    println!("modified in aram: {}", count_modified(&result.records, GameMode::Aram));
    Ok(())
}

pub(crate) async fn run_age(config: &AppConfig) -> anyhow::Result<()> {
    let service = AcquisitionService::from_config(config)?;
    match service.cached().await {
        Some(result) => println!(
            "{} ({} champions, patch {}, store {})",
            format_age(result.age_ms(Utc::now())),
            result.champions_count(),
            result.source_version.as_deref().unwrap_or("unknown"),
            service.store_description(),
        ),
        None => println!("no cached champion data in {}", service.store_description()),
    }
    Ok(())
}

pub(crate) async fn run_show(config: &AppConfig, options: &ShowOptions) -> anyhow::Result<()> {
    let service = AcquisitionService::from_config(config)?;
    let result = if options.cached {
        service
            .cached()
            .await
            .context("no cached champion data; run `aramdb-cli refresh` first")?
    } else {
        let outcome = service.read().await;
        service.shutdown().await;
        outcome?
    };
    print_result(&result, options)
}

pub(crate) async fn run_parse_file(path: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let literal = extract_table(&raw)?;
    let records = parse_champion_data(&literal)?;

    println!(
        "{} champions, patch {}",
        records.len(),
        extract_source_version(&raw).as_deref().unwrap_or("unknown"),
    );
    for mode in GameMode::ALL {
        println!("  {mode:<5} {} modified", count_modified(&records, mode));
    }
    Ok(())
}

pub(crate) async fn run_browser_check(config: &AppConfig) -> anyhow::Result<()> {
    let fetcher = HeadlessFetcher::new(config.headless.clone(), config.wiki.user_agent.clone());
    let outcome = fetcher.health_check().await;
    fetcher.shutdown().await;
    println!("headless browser ok: {}", outcome?);
    Ok(())
}

pub(crate) async fn run_records(config: &AppConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        config.store.cache_file.is_none(),
        "ARAMDB_CACHE_FILE is set; record listing needs the HTTP store"
    );
    let store = HttpCacheStore::new(&config.store, config.wiki.request_timeout_secs)?;
    let records = store.list_records().await?;
    println!(
        "{} records in collection {}",
        records.len(),
        config.store.collection
    );
    for record in &records {
        println!(
            "{}",
            format_record_line(record, record.id == config.store.record_id)
        );
    }
    Ok(())
}

pub(crate) fn format_record_line(record: &RecordSummary, is_active: bool) -> String {
    format!(
        "{} {:<20} updated {}",
        if is_active { "*" } else { " " },
        record.id,
        record.updated.as_deref().unwrap_or("unknown"),
    )
}

fn print_result(result: &FetchResult, options: &ShowOptions) -> anyhow::Result<()> {
    let selected: Vec<&ChampionRecord> = result
        .records
        .values()
        .filter(|record| {
            options
                .champion
                .as_deref()
                .is_none_or(|name| matches_champion(record, name))
        })
        .filter(|record| !options.modified_only || !record.mode(options.mode).is_baseline())
        .collect();

    if let Some(name) = options.champion.as_deref() {
        anyhow::ensure!(!selected.is_empty(), "champion '{name}' not found");
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    println!(
        "patch {} | fetched {} | origin {}",
        result.source_version.as_deref().unwrap_or("unknown"),
        result.fetched_at.format("%Y-%m-%d %H:%M UTC"),
        result.origin,
    );
    for record in selected {
        println!("{}", format_champion_line(record, options.mode));
    }
    Ok(())
}

pub(crate) fn matches_champion(record: &ChampionRecord, name: &str) -> bool {
    record.name.eq_ignore_ascii_case(name)
        || record.display_name().eq_ignore_ascii_case(name)
        || record.id.to_string() == name
}

pub(crate) fn format_champion_line(record: &ChampionRecord, mode: GameMode) -> String {
    let modifiers = record.mode(mode);
    let changes = if modifiers.is_baseline() {
        "baseline".to_owned()
    } else {
        modifiers
            .modified_fields()
            .into_iter()
            .map(|(field, value)| format!("{field}={value}"))
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!("{:<16} {:>4}  {changes}", record.display_name(), record.id)
}

pub(crate) fn format_age(age_ms: i64) -> String {
    let secs = age_ms / 1_000;
    match secs {
        s if s < 60 => format!("{s}s old"),
        s if s < 3_600 => format!("{}m old", s / 60),
        s if s < 86_400 => format!("{}h {}m old", s / 3_600, (s % 3_600) / 60),
        s => format!("{}d {}h old", s / 86_400, (s % 86_400) / 3_600),
    }
}

fn count_modified(records: &ChampionData, mode: GameMode) -> usize {
    records
        .values()
        .filter(|record| !record.mode(mode).is_baseline())
        .count()
}
