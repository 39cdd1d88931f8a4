pub mod app_config;
pub mod champions;
pub mod config;

pub use app_config::{AppConfig, Environment, HeadlessConfig, StoreConfig, WikiConfig};
pub use champions::{
    display_name, ChampionData, ChampionRecord, ExtendedAttributes, FetchResult, GameMode, Origin,
    StatModifiers,
};
pub use config::{load_app_config, load_app_config_from_env};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
