use std::collections::BTreeMap;

use aramdb_core::{ChampionRecord, StatModifiers};
use aramdb_store::RecordSummary;

use super::*;

fn record(id: u32, name: &str, aram: Option<StatModifiers>) -> ChampionRecord {
    ChampionRecord {
        id,
        name: name.to_owned(),
        modes: aram
            .map(|m| BTreeMap::from([(GameMode::Aram, m)]))
            .unwrap_or_default(),
        extended: None,
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["aramdb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_refresh_defaults_to_storing() {
    let cli = Cli::try_parse_from(["aramdb-cli", "refresh"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Refresh { dry_run: false })
    ));
}

#[test]
fn parses_refresh_dry_run() {
    let cli = Cli::try_parse_from(["aramdb-cli", "refresh", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Refresh { dry_run: true })));
}

#[test]
fn parses_age_command() {
    let cli = Cli::try_parse_from(["aramdb-cli", "age"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Age)));
}

#[test]
fn show_defaults_to_aram() {
    let cli = Cli::try_parse_from(["aramdb-cli", "show"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Show {
            mode: GameMode::Aram,
            champion: None,
            modified_only: false,
            cached: false,
            json: false,
        })
    ));
}

#[test]
fn show_accepts_mode_and_champion() {
    let cli = Cli::try_parse_from([
        "aramdb-cli",
        "show",
        "--mode",
        "URF",
        "--champion",
        "wukong",
        "--modified-only",
        "--cached",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Show {
            mode: GameMode::Urf,
            champion: Some(ref c),
            modified_only: true,
            cached: true,
            json: false,
        }) if c == "wukong"
    ));
}

#[test]
fn show_rejects_unknown_mode() {
    assert!(Cli::try_parse_from(["aramdb-cli", "show", "--mode", "arena"]).is_err());
}

#[test]
fn parses_parse_file_path() {
    let cli = Cli::try_parse_from(["aramdb-cli", "parse-file", "data/page.html"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::ParseFile { ref path }) if path == &PathBuf::from("data/page.html")
    ));
}

#[test]
fn parse_file_requires_path() {
    assert!(Cli::try_parse_from(["aramdb-cli", "parse-file"]).is_err());
}

#[test]
fn parses_browser_check() {
    let cli = Cli::try_parse_from(["aramdb-cli", "browser-check"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::BrowserCheck)));
}

#[test]
fn champion_line_lists_only_modified_fields() {
    let modifiers = StatModifiers {
        dmg_dealt: 1.05,
        dmg_taken: 0.95,
        ..StatModifiers::BASELINE
    };
    let line = commands::format_champion_line(&record(266, "Aatrox", Some(modifiers)), GameMode::Aram);

    assert!(line.starts_with("Aatrox"));
    assert!(line.contains("266"));
    assert!(line.contains("dmg_dealt=1.05"));
    assert!(line.contains("dmg_taken=0.95"));
    assert!(!line.contains("healing"));
}

#[test]
fn champion_line_marks_missing_mode_as_baseline() {
    let line = commands::format_champion_line(&record(62, "MonkeyKing", None), GameMode::Urf);

    assert!(line.starts_with("Wukong"));
    assert!(line.ends_with("baseline"));
}

#[test]
fn champion_matching_covers_key_forms() {
    let wukong = record(62, "MonkeyKing", None);
    assert!(commands::matches_champion(&wukong, "monkeyking"));
    assert!(commands::matches_champion(&wukong, "Wukong"));
    assert!(commands::matches_champion(&wukong, "62"));
    assert!(!commands::matches_champion(&wukong, "Gnar"));
}

#[test]
fn age_formatting_picks_largest_units() {
    assert_eq!(commands::format_age(4_500), "4s old");
    assert_eq!(commands::format_age(125_000), "2m old");
    assert_eq!(commands::format_age(3 * 3_600_000 + 5 * 60_000), "3h 5m old");
    assert_eq!(commands::format_age(2 * 86_400_000 + 3_600_000), "2d 1h old");
}

#[test]
fn parses_records_command() {
    let cli = Cli::try_parse_from(["aramdb-cli", "records"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Records)));
}

#[test]
fn record_line_marks_active_record() {
    let record = RecordSummary {
        id: "latestaramdata1".to_owned(),
        created: None,
        updated: Some("2024-01-10 12:00:00Z".to_owned()),
    };
    let active = commands::format_record_line(&record, true);
    assert!(active.starts_with("* latestaramdata1"));
    assert!(active.ends_with("updated 2024-01-10 12:00:00Z"));

    let other = commands::format_record_line(&RecordSummary { updated: None, ..record }, false);
    assert!(other.starts_with("  latestaramdata1"));
    assert!(other.ends_with("updated unknown"));
}
