//! Validate configuration command.

use anyhow::{Context, Result};
use std::path::Path;
use stockdesk_config::{load_config, StoreBackend};

/// Load `config_path` strictly (the file must exist) and print the
/// effective settings, environment overrides included.
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)
        .with_context(|| format!("invalid configuration in {}", config_path.display()))?;

    println!("# {} is valid", config_path.display());
    match config.store.backend {
        StoreBackend::Sqlite => println!("# portfolios persist in {}", config.store.path),
        StoreBackend::Memory => println!("# memory store: nothing is persisted"),
    }
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}
