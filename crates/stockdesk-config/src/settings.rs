//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stockdesk_data::{FetcherConfig, SimulatedQuoteSource};
use stockdesk_service::SellPricing;

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub fetcher: FetcherSettings,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

impl AppConfig {
    /// Reject values that would parse but cannot work.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.fetcher.pool_size == 0 {
            return Err(SettingsError::Invalid {
                key: "fetcher.pool_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fetcher.timeout_ms == 0 {
            return Err(SettingsError::Invalid {
                key: "fetcher.timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.ledger.starting_cash < Decimal::ZERO {
            return Err(SettingsError::Invalid {
                key: "ledger.starting_cash",
                reason: format!("{} is negative", self.ledger.starting_cash),
            });
        }
        if !matches!(
            self.logging.format.as_str(),
            "pretty" | "json" | "compact"
        ) {
            return Err(SettingsError::Invalid {
                key: "logging.format",
                reason: format!("unknown format {:?}", self.logging.format),
            });
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stockdesk".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty, compact or json
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Quote fetching settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherSettings {
    pub pool_size: usize,
    pub timeout_ms: u64,
    pub history_days: usize,
    /// Seed of the simulated quote source
    pub seed: u64,
    /// Simulated per-request latency
    pub latency_ms: u64,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            pool_size: stockdesk_data::DEFAULT_POOL_SIZE,
            timeout_ms: stockdesk_data::DEFAULT_TIMEOUT.as_millis() as u64,
            history_days: stockdesk_data::DEFAULT_HISTORY_DAYS,
            seed: 0,
            latency_ms: stockdesk_data::DEFAULT_LATENCY.as_millis() as u64,
        }
    }
}

impl FetcherSettings {
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            pool_size: self.pool_size,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn simulated_source(&self) -> SimulatedQuoteSource {
        SimulatedQuoteSource::new(self.seed)
            .with_history_days(self.history_days)
            .with_latency(Duration::from_millis(self.latency_ms))
    }
}

/// Ledger settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    /// Cash credited to new accounts
    pub starting_cash: Decimal,
    pub sell_pricing: SellPricing,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            starting_cash: dec!(10000),
            sell_pricing: SellPricing::AveragePrice,
        }
    }
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    /// Nothing survives the process
    Memory,
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub path: String,
    pub pool_size: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: "data/stockdesk.db".to_string(),
            pool_size: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.fetcher.pool_size, 5);
        assert_eq!(config.fetcher.timeout_ms, 5000);
        assert_eq!(config.fetcher.history_days, 30);
        assert_eq!(config.fetcher.latency_ms, 100);
        assert_eq!(config.ledger.starting_cash, dec!(10000));
        assert_eq!(config.ledger.sell_pricing, SellPricing::AveragePrice);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [fetcher]
            pool_size = 8

            [ledger]
            sell_pricing = "last_quote"
            "#,
        )
        .unwrap();

        assert_eq!(config.fetcher.pool_size, 8);
        assert_eq!(config.fetcher.timeout_ms, 5000);
        assert_eq!(config.ledger.sell_pricing, SellPricing::LastQuote);
        assert_eq!(config.store, StoreSettings::default());
    }

    #[test]
    fn test_validate_rejects_zero_pool() {
        let mut config = AppConfig::default();
        config.fetcher.pool_size = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Invalid { key: "fetcher.pool_size", .. })
        ));
    }

    #[test]
    fn test_fetcher_conversion() {
        let settings = FetcherSettings {
            timeout_ms: 250,
            ..Default::default()
        };
        assert_eq!(settings.fetcher_config().timeout, Duration::from_millis(250));
    }
}
