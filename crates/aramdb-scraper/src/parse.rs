//! Walks an extracted table literal into champion records.
//!
//! The literal is a sequence of `["<key>"] = { ... }` entries. Each entry is
//! nested several levels deep (`stats` holds one block per game mode), so
//! blocks are found with the depth-counting scanner and only the innermost
//! flat mode blocks go through the regex-based stat mapper.

use std::collections::BTreeMap;

use aramdb_core::{ChampionData, ChampionRecord, ExtendedAttributes, GameMode};

use crate::error::ParseError;
use crate::normalize::{map_stat_block, parse_numeric};
use crate::scan::{fields, table_body, LuaValue};

const SKILL_SLOTS: [(&str, &str); 5] = [
    ("skill_i", "i"),
    ("skill_q", "q"),
    ("skill_w", "w"),
    ("skill_e", "e"),
    ("skill_r", "r"),
];

/// Parses every valid entry of `literal`, in source order.
///
/// Entries without an integer `id` or an identifier-safe `apiname` are
/// skipped with a debug log.
#[must_use]
pub fn parse_records(literal: &str) -> Vec<ChampionRecord> {
    parse_entries(literal).0
}

/// Parses `literal` into records keyed by id.
///
/// # Errors
///
/// Returns [`ParseError::NoRecords`] when no entry yields a valid record.
pub fn parse_champion_data(literal: &str) -> Result<ChampionData, ParseError> {
    let (records, entries) = parse_entries(literal);

    let mut data = ChampionData::new();
    for record in records {
        if let Some(previous) = data.insert(record.id.to_string(), record) {
            tracing::debug!(
                id = previous.id,
                name = %previous.name,
                "duplicate champion id, later entry wins"
            );
        }
    }

    if data.is_empty() {
        return Err(ParseError::NoRecords { entries });
    }

    let modified = data
        .values()
        .filter(|record| record.modes.values().any(|stats| !stats.is_baseline()))
        .count();
    tracing::info!(
        champions = data.len(),
        entries,
        modified,
        "parsed champion table"
    );
    Ok(data)
}

fn parse_entries(literal: &str) -> (Vec<ChampionRecord>, usize) {
    let mut records = Vec::new();
    let mut entries = 0usize;

    for field in fields(table_body(literal)) {
        let LuaValue::Table(body) = field.value else {
            continue;
        };
        entries += 1;
        let label = field.key.as_deref().unwrap_or("<positional>");
        if let Some(record) = parse_entry(label, body) {
            records.push(record);
        }
    }

    (records, entries)
}

fn parse_entry(label: &str, body: &str) -> Option<ChampionRecord> {
    let mut id = None;
    let mut name = None;
    let mut modes = BTreeMap::new();
    let mut extended = ExtendedAttributes::default();

    for field in fields(body) {
        let Some(key) = field.key.as_deref() else {
            continue;
        };
        match (key, &field.value) {
            ("id", LuaValue::Scalar(raw)) => id = raw.parse::<u32>().ok(),
            ("apiname", LuaValue::Str(raw)) if is_identifier(raw) => name = Some(raw.clone()),
            ("title", LuaValue::Str(raw)) => extended.title = Some(raw.clone()),
            ("role", value) => extended.roles = string_list(value),
            ("stats", LuaValue::Table(stats)) => {
                parse_stats(stats, &mut modes, &mut extended.base_stats);
            }
            (key, value) => {
                if let Some((_, slot)) = SKILL_SLOTS.iter().find(|(k, _)| *k == key) {
                    let skills = string_list(value);
                    if !skills.is_empty() {
                        extended.skills.insert((*slot).to_string(), skills);
                    }
                }
            }
        }
    }

    let Some(id) = id else {
        tracing::debug!(entry = label, "skipping entry without integer id");
        return None;
    };
    let Some(name) = name else {
        tracing::debug!(entry = label, id, "skipping entry without valid apiname");
        return None;
    };

    Some(ChampionRecord {
        id,
        name,
        modes,
        extended: (!extended.is_empty()).then_some(extended),
    })
}

fn parse_stats(
    body: &str,
    modes: &mut BTreeMap<GameMode, aramdb_core::StatModifiers>,
    base_stats: &mut BTreeMap<String, f64>,
) {
    for field in fields(body) {
        let Some(key) = field.key else {
            continue;
        };
        match field.value {
            LuaValue::Table(block) => {
                if let Some(mode) = GameMode::from_key(&key) {
                    modes.insert(mode, map_stat_block(block));
                }
            }
            LuaValue::Scalar(raw) => {
                if let Some(value) = parse_numeric(raw) {
                    base_stats.insert(key, value);
                }
            }
            LuaValue::Str(_) => {}
        }
    }
}

/// A string, or a table of positional strings, as a list.
fn string_list(value: &LuaValue<'_>) -> Vec<String> {
    match value {
        LuaValue::Str(s) if !s.is_empty() => vec![s.clone()],
        LuaValue::Table(body) => fields(body)
            .filter(|field| field.key.is_none() || field.key.as_deref().is_some_and(is_index))
            .filter_map(|field| match field.value {
                LuaValue::Str(s) if !s.is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
