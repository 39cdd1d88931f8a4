//! Champion balance domain types shared by the scraper, the cache store and
//! the acquisition service.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Game modes that carry per-champion balance blocks on the wiki.
///
/// `Aram` is the base mode; the rest rotate in and out of the live game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Aram,
    Urf,
    Usb,
    Ofa,
    Nb,
    Ar,
}

impl GameMode {
    pub const ALL: [GameMode; 6] = [
        GameMode::Aram,
        GameMode::Urf,
        GameMode::Usb,
        GameMode::Ofa,
        GameMode::Nb,
        GameMode::Ar,
    ];

    /// Block key used for this mode inside a champion's `stats` table.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            GameMode::Aram => "aram",
            GameMode::Urf => "urf",
            GameMode::Usb => "usb",
            GameMode::Ofa => "ofa",
            GameMode::Nb => "nb",
            GameMode::Ar => "ar",
        }
    }

    /// Case-insensitive lookup by block key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| format!("unknown game mode \"{s}\""))
    }
}

/// Balance modifiers for one champion in one game mode.
///
/// Multiplier fields use `1.0` as "unmodified"; `ability_haste` is additive
/// with `0.0` as "unmodified". Fields missing from source data hold their
/// baseline, so arithmetic on any field is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatModifiers {
    pub dmg_dealt: f64,
    pub dmg_taken: f64,
    pub healing: f64,
    pub shielding: f64,
    pub ability_haste: f64,
    pub attack_speed: f64,
    pub energy_regen: f64,
    pub tenacity: f64,
}

impl StatModifiers {
    pub const BASELINE: StatModifiers = StatModifiers {
        dmg_dealt: 1.0,
        dmg_taken: 1.0,
        healing: 1.0,
        shielding: 1.0,
        ability_haste: 0.0,
        attack_speed: 1.0,
        energy_regen: 1.0,
        tenacity: 1.0,
    };

    /// Field names paired with their current values, in schema order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, f64); 8] {
        [
            ("dmg_dealt", self.dmg_dealt),
            ("dmg_taken", self.dmg_taken),
            ("healing", self.healing),
            ("shielding", self.shielding),
            ("ability_haste", self.ability_haste),
            ("attack_speed", self.attack_speed),
            ("energy_regen", self.energy_regen),
            ("tenacity", self.tenacity),
        ]
    }

    /// Fields whose value differs from the baseline.
    #[must_use]
    pub fn modified_fields(&self) -> Vec<(&'static str, f64)> {
        self.fields()
            .into_iter()
            .zip(Self::BASELINE.fields())
            .filter(|((_, value), (_, baseline))| (value - baseline).abs() > f64::EPSILON)
            .map(|(field, _)| field)
            .collect()
    }

    #[must_use]
    pub fn is_baseline(&self) -> bool {
        self.modified_fields().is_empty()
    }
}

impl Default for StatModifiers {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Optional champion attributes carried alongside the balance modifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtendedAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Flat numeric entries of the `stats` block (`hp_base`, `ms`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub base_stats: BTreeMap<String, f64>,
    /// Skill names keyed by slot (`i`, `q`, `w`, `e`, `r`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skills: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

impl ExtendedAttributes {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.base_stats.is_empty()
            && self.skills.is_empty()
            && self.roles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionRecord {
    pub id: u32,
    /// API-safe identifier (`apiname` on the wiki). See [`display_name`].
    pub name: String,
    #[serde(default)]
    pub modes: BTreeMap<GameMode, StatModifiers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<ExtendedAttributes>,
}

impl ChampionRecord {
    /// Modifiers for `mode`, or the baseline when the wiki has no block for it.
    #[must_use]
    pub fn mode(&self, mode: GameMode) -> StatModifiers {
        self.modes.get(&mode).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }
}

/// Parsed champion records keyed by the stringified champion id.
pub type ChampionData = BTreeMap<String, ChampionRecord>;

/// Maps an API identifier to the name the game client displays.
///
/// Only two champions differ; everything else passes through.
#[must_use]
pub fn display_name(api_name: &str) -> &str {
    match api_name {
        "GnarBig" => "Gnar",
        "MonkeyKing" => "Wukong",
        other => other,
    }
}

/// Where a [`FetchResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Fetched and parsed during this call.
    Fresh,
    /// Served from the cache without touching upstream.
    Cache,
    /// A refresh failed and the previous entry was served instead.
    StaleFallback,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Fresh => write!(f, "fresh"),
            Origin::Cache => write!(f, "cache"),
            Origin::StaleFallback => write!(f, "stale-fallback"),
        }
    }
}

/// One champion dataset together with its provenance.
///
/// `fetched_at` is when the page was fetched, not when the upstream patch
/// was released; the wiki data carries no reliable release date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub records: ChampionData,
    pub fetched_at: DateTime<Utc>,
    pub source_version: Option<String>,
    pub origin: Origin,
}

impl FetchResult {
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Milliseconds elapsed between `fetched_at` and `now`, floored at zero.
    #[must_use]
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.fetched_at).num_milliseconds().max(0)
    }

    #[must_use]
    pub fn champions_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
#[path = "champions_test.rs"]
mod tests;
