use rust_decimal_macros::dec;
use std::fs;
use stockdesk_config::{load_config, load_config_or_default, AppConfig, StoreBackend};
use stockdesk_service::SellPricing;
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stockdesk.toml");
    fs::write(
        &path,
        r#"
[app]
name = "desk"

[logging]
level = "debug"
format = "json"

[ledger]
starting_cash = 2500
sell_pricing = "last_quote"

[store]
backend = "memory"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.app.name, "desk");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.ledger.starting_cash, dec!(2500));
    assert_eq!(config.ledger.sell_pricing, SellPricing::LastQuote);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.fetcher.pool_size, 5);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(load_config(&path).is_err());
    assert_eq!(load_config_or_default(&path).unwrap(), AppConfig::default());
}

#[test]
fn test_invalid_value_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[fetcher]\npool_size = 0\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("fetcher.pool_size"));
}
