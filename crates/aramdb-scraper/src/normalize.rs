//! Maps the wiki's stat-key spellings onto [`StatModifiers`].
//!
//! Wiki editors are inconsistent (`dmg_dealt`, `damage_dealt`, `dealt`), so
//! every key goes through a case-insensitive alias table. Unknown keys and
//! unparsable values are dropped; the affected field keeps its baseline.

use std::sync::LazyLock;

use aramdb_core::StatModifiers;
use regex::Regex;

use crate::scan::strip_comments;

/// One field of the closed stat schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    DmgDealt,
    DmgTaken,
    Healing,
    Shielding,
    AbilityHaste,
    AttackSpeed,
    EnergyRegen,
    Tenacity,
}

impl StatField {
    /// Writes `value` into the matching field of `stats`.
    pub fn apply(self, stats: &mut StatModifiers, value: f64) {
        let slot = match self {
            StatField::DmgDealt => &mut stats.dmg_dealt,
            StatField::DmgTaken => &mut stats.dmg_taken,
            StatField::Healing => &mut stats.healing,
            StatField::Shielding => &mut stats.shielding,
            StatField::AbilityHaste => &mut stats.ability_haste,
            StatField::AttackSpeed => &mut stats.attack_speed,
            StatField::EnergyRegen => &mut stats.energy_regen,
            StatField::Tenacity => &mut stats.tenacity,
        };
        *slot = value;
    }
}

/// Resolves a raw stat key to its schema field, ignoring case and
/// surrounding whitespace.
#[must_use]
pub fn canonical_field(key: &str) -> Option<StatField> {
    let field = match key.trim().to_ascii_lowercase().as_str() {
        "dmg_dealt" | "damage_dealt" | "dealt" | "dmgdealt" => StatField::DmgDealt,
        "dmg_taken" | "damage_taken" | "taken" | "dmgtaken" => StatField::DmgTaken,
        "healing" | "heal" | "heal_power" => StatField::Healing,
        "shielding" | "shield" | "shield_power" => StatField::Shielding,
        "ability_haste" | "haste" | "ah" | "abilityhaste" => StatField::AbilityHaste,
        "attack_speed" | "as" | "attackspeed" => StatField::AttackSpeed,
        "energy_regen" | "energy" | "energyregen" => StatField::EnergyRegen,
        "tenacity" | "tenacity_mod" => StatField::Tenacity,
        _ => return None,
    };
    Some(field)
}

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("numeric literal regex is valid")
});

static FLAT_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:\[\s*["']?([A-Za-z_][A-Za-z0-9_]*)["']?\s*\]|\b([A-Za-z_][A-Za-z0-9_]*))\s*=\s*([^,;}\s]+)"#,
    )
    .expect("flat pair regex is valid")
});

/// Parses a Lua numeric literal: optional sign, digits, optional fraction.
///
/// Exponents, hex and anything else yield `None`.
#[must_use]
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !NUMERIC_LITERAL.is_match(raw) {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Builds modifiers from already-split `(key, value)` pairs.
#[must_use]
pub fn map_stat_pairs<'a, I>(pairs: I) -> StatModifiers
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut stats = StatModifiers::BASELINE;
    for (key, raw) in pairs {
        let Some(field) = canonical_field(key) else {
            continue;
        };
        match parse_numeric(raw) {
            Some(value) => field.apply(&mut stats, value),
            None => tracing::debug!(key, raw, "dropping unparsable stat value"),
        }
    }
    stats
}

/// Builds modifiers from the text of an isolated, flat mode block such as
/// `["dmg_dealt"] = 1.05, ["dmg_taken"] = 0.95`. Commented-out pairs are
/// ignored.
#[must_use]
pub fn map_stat_block(block: &str) -> StatModifiers {
    let block = strip_comments(block);
    map_stat_pairs(FLAT_PAIR.captures_iter(&block).filter_map(|caps| {
        let key = caps.get(1).or_else(|| caps.get(2))?.as_str();
        let value = caps.get(3)?.as_str();
        Some((key, value))
    }))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
