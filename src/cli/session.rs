//! Wiring of stores, ledger, fetcher and service for one command.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use stockdesk_config::{AppConfig, StoreBackend};
use stockdesk_core::traits::{AccountStore, PortfolioStore};
use stockdesk_core::types::NewAccount;
use stockdesk_data::{simulated_fetcher, QuoteFetcher};
use stockdesk_ledger::PortfolioLedger;
use stockdesk_service::TradingService;
use stockdesk_store::{MemoryStore, SqliteStore};
use tracing::{debug, info};

/// Both store roles, backed by one object.
pub struct Stores {
    pub portfolios: Arc<dyn PortfolioStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub backend: StoreBackend,
}

impl Stores {
    pub fn open(config: &AppConfig) -> Result<Self> {
        let backend = config.store.backend;
        match backend {
            StoreBackend::Sqlite => {
                let path = Path::new(&config.store.path);
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("creating {}", dir.display()))?;
                }
                let store = Arc::new(
                    SqliteStore::open(path, config.store.pool_size)
                        .with_context(|| format!("opening store at {}", path.display()))?,
                );
                Ok(Self {
                    portfolios: store.clone(),
                    accounts: store,
                    backend,
                })
            }
            StoreBackend::Memory => {
                let store = Arc::new(MemoryStore::new());
                Ok(Self {
                    portfolios: store.clone(),
                    accounts: store,
                    backend,
                })
            }
        }
    }
}

pub fn fetcher(config: &AppConfig) -> QuoteFetcher {
    simulated_fetcher(
        config.fetcher.simulated_source(),
        config.fetcher.fetcher_config(),
    )
}

/// Trading service for `username`.
///
/// The memory backend starts empty every run, so the account is created on
/// the fly there.
pub fn open_service(config: &AppConfig, username: &str) -> Result<TradingService> {
    let stores = Stores::open(config)?;

    let account = match stores.accounts.find_account(username)? {
        Some(account) => account,
        None if stores.backend == StoreBackend::Memory => {
            debug!(username, "Provisioning ephemeral account");
            stores.accounts.create_account(
                &NewAccount::trader(username, format!("{username}@localhost")),
                config.ledger.starting_cash,
            )?
        }
        None => bail!("no account named {username:?}; create it with `stockdesk open-account`"),
    };

    let ledger = PortfolioLedger::open(Arc::clone(&stores.portfolios), account.id)
        .with_context(|| format!("loading portfolio of {username}"))?;
    info!(
        username,
        role = %account.role,
        sell_pricing = %config.ledger.sell_pricing,
        "Session opened"
    );

    Ok(TradingService::new(account, Arc::new(ledger))
        .with_sell_pricing(config.ledger.sell_pricing))
}
