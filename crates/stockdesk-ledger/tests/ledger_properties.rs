//! Ledger invariants under random operation sequences.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use stockdesk_core::error::LedgerError;
use stockdesk_core::traits::PortfolioStore;
use stockdesk_core::types::Quote;
use stockdesk_ledger::{to_money, PortfolioLedger};
use stockdesk_store::MemoryStore;

#[derive(Debug, Clone)]
enum Op {
    Buy { symbol: usize, quantity: i64, cents: u32 },
    Sell { symbol: usize, quantity: i64, cents: u32 },
}

const SYMBOLS: [&str; 3] = ["AAPL", "MSFT", "TSLA"];

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, -2..40i64, 100..50_000u32)
            .prop_map(|(symbol, quantity, cents)| Op::Buy { symbol, quantity, cents }),
        (0..3usize, -2..40i64, 100..50_000u32)
            .prop_map(|(symbol, quantity, cents)| Op::Sell { symbol, quantity, cents }),
    ]
}

fn price(cents: u32) -> Decimal {
    Decimal::new(cents as i64, 2)
}

fn new_ledger(cash: Decimal) -> (Arc<MemoryStore>, PortfolioLedger) {
    let store = Arc::new(MemoryStore::new());
    let portfolio = store.open_portfolio(1, cash);
    let ledger = PortfolioLedger::new(portfolio, Arc::clone(&store) as Arc<dyn PortfolioStore>);
    (store, ledger)
}

proptest! {
    #[test]
    fn cash_never_negative_and_store_agrees(ops in prop::collection::vec(op(), 1..60)) {
        let (store, ledger) = new_ledger(dec!(10000));

        for op in ops {
            let before = ledger.snapshot();
            let result = match op {
                Op::Buy { symbol, quantity, cents } => {
                    let quote = Quote::new(SYMBOLS[symbol], SYMBOLS[symbol], cents_to_f64(cents));
                    ledger.buy(&quote, quantity)
                }
                Op::Sell { symbol, quantity, cents } => {
                    ledger.sell(SYMBOLS[symbol], quantity, price(cents))
                }
            };

            if result.is_err() {
                prop_assert_eq!(ledger.snapshot(), before);
            }
            prop_assert!(ledger.cash_balance() >= Decimal::ZERO);
            for holding in ledger.snapshot().holdings.values() {
                prop_assert!(holding.quantity > 0);
                prop_assert!(holding.average_price > Decimal::ZERO);
            }
        }

        let id = ledger.portfolio_id();
        prop_assert_eq!(store.cash_balance(id), Some(ledger.cash_balance()));
        prop_assert_eq!(store.holdings(id).len(), ledger.snapshot().holding_count());
    }

    #[test]
    fn weighted_average_is_exact(
        q1 in 1..100i64, c1 in 100..100_000u32,
        q2 in 1..100i64, c2 in 100..100_000u32,
    ) {
        let (_store, ledger) = new_ledger(dec!(100000000));
        let p1 = to_money("AAPL", cents_to_f64(c1)).unwrap();
        let p2 = to_money("AAPL", cents_to_f64(c2)).unwrap();

        ledger.buy(&Quote::new("AAPL", "Apple Inc.", cents_to_f64(c1)), q1).unwrap();
        ledger.buy(&Quote::new("AAPL", "Apple Inc.", cents_to_f64(c2)), q2).unwrap();

        let holding = ledger.holding("AAPL").unwrap();
        let expected = (Decimal::from(q1) * p1 + Decimal::from(q2) * p2) / Decimal::from(q1 + q2);
        prop_assert_eq!(holding.quantity, q1 + q2);
        prop_assert_eq!(holding.average_price, expected);
    }

    #[test]
    fn buy_then_sell_round_trips_cash(quantity in 1..50i64, cents in 100..20_000u32) {
        let (_store, ledger) = new_ledger(dec!(10000));
        let quote = Quote::new("MSFT", "Microsoft Corporation", cents_to_f64(cents));

        match ledger.buy(&quote, quantity) {
            Ok(tx) => {
                ledger.sell("MSFT", quantity, tx.price).unwrap();
                prop_assert_eq!(ledger.cash_balance(), dec!(10000));
                prop_assert!(ledger.holding("MSFT").is_none());
            }
            Err(e) => {
                let is_funds = matches!(e, LedgerError::InsufficientFunds { .. });
                prop_assert!(is_funds);
            }
        }
    }
}

fn cents_to_f64(cents: u32) -> f64 {
    cents as f64 / 100.0
}

#[test]
fn quote_price_conversion_matches_cents() {
    assert_eq!(to_money("AAPL", 150.25).unwrap(), dec!(150.25));
    assert!(to_money("AAPL", f64::INFINITY).is_err());
    assert!(to_money("AAPL", 0.0).is_err());
}
