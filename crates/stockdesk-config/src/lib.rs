//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, FetcherSettings, LedgerSettings, LoggingConfig, StoreBackend,
    StoreSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix, e.g. `STOCKDESK__FETCHER__POOL_SIZE=8`.
pub const ENV_PREFIX: &str = "STOCKDESK";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] ConfigError),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    build(path, true)
}

/// Like [`load_config`], but a missing file yields defaults plus environment.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, SettingsError> {
    build(path, false)
}

fn build(path: &Path, required: bool) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: AppConfig = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
