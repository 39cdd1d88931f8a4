use super::*;

use chrono::TimeZone;

#[test]
fn stat_modifiers_default_is_baseline() {
    let stats = StatModifiers::default();
    assert_eq!(stats, StatModifiers::BASELINE);
    assert!((stats.dmg_dealt - 1.0).abs() < f64::EPSILON);
    assert!(stats.ability_haste.abs() < f64::EPSILON);
    assert!(stats.is_baseline());
}

#[test]
fn stat_modifiers_deserialize_fills_missing_fields_with_baseline() {
    let stats: StatModifiers =
        serde_json::from_str(r#"{"dmg_dealt": 1.05, "ability_haste": 10}"#).unwrap();
    assert!((stats.dmg_dealt - 1.05).abs() < f64::EPSILON);
    assert!((stats.ability_haste - 10.0).abs() < f64::EPSILON);
    assert!((stats.dmg_taken - 1.0).abs() < f64::EPSILON);
    assert!((stats.tenacity - 1.0).abs() < f64::EPSILON);
}

#[test]
fn modified_fields_lists_only_changed_values() {
    let stats = StatModifiers {
        dmg_taken: 0.9,
        ability_haste: -5.0,
        ..StatModifiers::default()
    };
    assert_eq!(
        stats.modified_fields(),
        vec![("dmg_taken", 0.9), ("ability_haste", -5.0)]
    );
    assert!(!stats.is_baseline());
}

#[test]
fn game_mode_from_key_is_case_insensitive() {
    assert_eq!(GameMode::from_key("ARAM"), Some(GameMode::Aram));
    assert_eq!(GameMode::from_key(" urf "), Some(GameMode::Urf));
    assert_eq!(GameMode::from_key("ranked"), None);
    assert_eq!("ofa".parse::<GameMode>(), Ok(GameMode::Ofa));
}

#[test]
fn record_mode_falls_back_to_baseline() {
    let record = ChampionRecord {
        id: 266,
        name: "Aatrox".to_owned(),
        modes: BTreeMap::new(),
        extended: None,
    };
    assert_eq!(record.mode(GameMode::Urf), StatModifiers::BASELINE);
}

#[test]
fn display_name_renames_known_quirks() {
    assert_eq!(display_name("GnarBig"), "Gnar");
    assert_eq!(display_name("MonkeyKing"), "Wukong");
    assert_eq!(display_name("Aatrox"), "Aatrox");
}

#[test]
fn origin_serializes_kebab_case() {
    assert_eq!(
        serde_json::to_string(&Origin::StaleFallback).unwrap(),
        "\"stale-fallback\""
    );
    assert_eq!(Origin::Fresh.to_string(), "fresh");
}

#[test]
fn age_ms_never_negative() {
    let fetched_at = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
    let result = FetchResult {
        records: ChampionData::new(),
        fetched_at,
        source_version: None,
        origin: Origin::Cache,
    };
    let later = fetched_at + chrono::Duration::milliseconds(1_500);
    assert_eq!(result.age_ms(later), 1_500);
    let earlier = fetched_at - chrono::Duration::seconds(5);
    assert_eq!(result.age_ms(earlier), 0);
}
