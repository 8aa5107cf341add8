use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use stockdesk_core::error::{LedgerError, TradeError};
use stockdesk_core::traits::{AccountStore, PortfolioStore};
use stockdesk_core::types::NewAccount;
use stockdesk_data::{simulated_fetcher, FetcherConfig, SimulatedQuoteSource};
use stockdesk_ledger::PortfolioLedger;
use stockdesk_service::{SellPricing, TradingService};
use stockdesk_store::MemoryStore;

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_refresh_then_trade_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let account = store
        .create_account(&NewAccount::trader("hana", "hana@example.com"), dec!(10000))
        .unwrap();
    let dyn_store: Arc<dyn PortfolioStore> = Arc::clone(&store) as Arc<dyn PortfolioStore>;
    let ledger = Arc::new(PortfolioLedger::open(dyn_store, account.id).unwrap());
    let service = TradingService::new(account, Arc::clone(&ledger));

    let fetcher = simulated_fetcher(
        SimulatedQuoteSource::new(1).with_latency(Duration::from_millis(1)),
        FetcherConfig::default(),
    );
    let report = service
        .refresh(&fetcher, &symbols(&["AAPL", "MSFT", ""]))
        .await;
    assert_eq!(report.quotes.len(), 2);
    assert!(service.quote("AAPL").is_some());
    assert!(service.quote("").is_none());

    let bought = service.buy("AAPL", 3).unwrap();
    assert_eq!(bought.transaction.quantity, 3);
    assert!(bought.cash_balance < dec!(10000));

    let sold = service.sell("AAPL", 3).unwrap();
    assert_eq!(sold.cash_balance, dec!(10000));
    assert_eq!(sold.transaction.price, bought.transaction.price);
    assert!(ledger.holding("AAPL").is_none());

    // Full history reached the store
    assert_eq!(store.transactions(ledger.portfolio_id()).len(), 2);
    let reloaded = store.load_portfolio(service.account().id).unwrap();
    assert_eq!(reloaded.cash_balance, dec!(10000));
}

#[tokio::test]
async fn test_last_quote_pricing_and_rejections() {
    let store = Arc::new(MemoryStore::new());
    let portfolio = store.open_portfolio(5, dec!(100));
    let ledger = Arc::new(PortfolioLedger::new(portfolio, store));
    let account = stockdesk_core::types::Account {
        id: 5,
        username: "ivan".to_string(),
        name: "Ivan".to_string(),
        email: "ivan@example.com".to_string(),
        role: Default::default(),
    };
    let service =
        TradingService::new(account, Arc::clone(&ledger)).with_sell_pricing(SellPricing::LastQuote);

    let fetcher = simulated_fetcher(
        SimulatedQuoteSource::new(9).with_latency(Duration::ZERO),
        FetcherConfig::default(),
    );
    service.refresh(&fetcher, &symbols(&["TSLA"])).await;

    // Simulated prices start at 50, so 100 cash cannot buy 3 shares
    assert!(matches!(
        service.buy("TSLA", 3),
        Err(TradeError::Ledger(LedgerError::InsufficientFunds { .. }))
    ));
    assert!(matches!(
        service.sell("TSLA", 1),
        Err(TradeError::Ledger(LedgerError::InsufficientShares { .. }))
    ));
    assert_eq!(ledger.cash_balance(), dec!(100));
    assert!(ledger.recent_transactions(10).is_empty());
}
