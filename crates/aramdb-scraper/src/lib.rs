//! Wiki acquisition and parsing for champion balance data.
//!
//! The pipeline runs in one direction: [`fetch::FetchChain`] downloads the
//! wiki edit page, [`extract::extract_table`] pulls the Lua table literal out
//! of the HTML, [`parse::parse_champion_data`] walks the literal into
//! [`aramdb_core::ChampionRecord`]s, and [`normalize`] maps raw stat keys onto
//! the closed [`aramdb_core::StatModifiers`] schema.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod parse;

mod scan;

pub use error::{ExtractionError, FetchError, ParseError, TierError};
pub use extract::{decode_entities, extract_source_version, extract_table};
pub use fetch::{DirectFetcher, FetchChain, FetchStrategy, HeadlessFetcher, RelayFetcher};
pub use normalize::{canonical_field, map_stat_block, map_stat_pairs, StatField};
pub use parse::{parse_champion_data, parse_records};
