//! Holding and portfolio types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use super::Transaction;

/// Number of most recent transactions kept retrievable in memory.
pub const TRANSACTION_WINDOW: usize = 50;

/// Cash credited to a portfolio when its account is created.
pub const DEFAULT_STARTING_CASH: Decimal = dec!(10000);

/// A position in a single security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Symbol
    pub symbol: String,
    /// Number of shares held, always positive
    pub quantity: i64,
    /// Quantity-weighted mean acquisition price
    pub average_price: Decimal,
}

impl Holding {
    /// Create a new holding.
    pub fn new(symbol: impl Into<String>, quantity: i64, average_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            average_price,
        }
    }

    /// Cost basis (quantity * average_price).
    pub fn cost_basis(&self) -> Decimal {
        Decimal::from(self.quantity) * self.average_price
    }

    /// Value of the holding at `price`.
    pub fn market_value(&self, price: Decimal) -> Decimal {
        Decimal::from(self.quantity) * price
    }

    /// Add shares acquired at `price`, updating the weighted average.
    pub fn add(&mut self, quantity: i64, price: Decimal) {
        let new_quantity = self.quantity + quantity;
        let total_cost = self.cost_basis() + Decimal::from(quantity) * price;
        self.average_price = total_cost / Decimal::from(new_quantity);
        self.quantity = new_quantity;
    }

    /// Remove shares. The average price is left untouched.
    pub fn reduce(&mut self, quantity: i64) {
        self.quantity -= quantity;
    }

    /// True once every share has been sold.
    pub fn is_empty(&self) -> bool {
        self.quantity <= 0
    }
}

impl std::fmt::Display for Holding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} shares @ ${:.2}",
            self.symbol, self.quantity, self.average_price
        )
    }
}

/// Portfolio containing cash, holdings and recent history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Portfolio identity
    pub id: i64,
    /// Owning account
    pub user_id: i64,
    /// Available cash, never negative after a committed operation
    pub cash_balance: Decimal,
    /// Map of symbol to holding
    pub holdings: HashMap<String, Holding>,
    /// Recent transactions, oldest first, capped at [`TRANSACTION_WINDOW`]
    transactions: VecDeque<Transaction>,
}

impl Portfolio {
    /// Create an empty portfolio.
    pub fn new(id: i64, user_id: i64, cash_balance: Decimal) -> Self {
        Self {
            id,
            user_id,
            cash_balance,
            holdings: HashMap::new(),
            transactions: VecDeque::new(),
        }
    }

    /// Get a holding by symbol.
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.get(symbol)
    }

    /// Quantity held of `symbol`, zero if none.
    pub fn quantity_of(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).map(|h| h.quantity).unwrap_or(0)
    }

    /// Get the number of holdings.
    pub fn holding_count(&self) -> usize {
        self.holdings.len()
    }

    /// Held symbols, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.holdings.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Append a transaction, evicting the oldest beyond the window.
    pub fn record_transaction(&mut self, transaction: Transaction) {
        self.transactions.push_back(transaction);
        while self.transactions.len() > TRANSACTION_WINDOW {
            self.transactions.pop_front();
        }
    }

    /// Up to `limit` transactions, most recent first.
    pub fn recent_transactions(&self, limit: usize) -> Vec<&Transaction> {
        self.transactions.iter().rev().take(limit).collect()
    }

    /// Timestamp of the latest recorded transaction.
    pub fn last_transaction_at(&self) -> Option<DateTime<Utc>> {
        self.transactions.back().map(|t| t.timestamp)
    }

    /// Market value of all holdings. Symbols missing from `prices` are
    /// valued at their average price.
    pub fn holdings_value(&self, prices: &HashMap<String, f64>) -> Decimal {
        self.holdings
            .values()
            .map(|h| {
                let price = prices
                    .get(&h.symbol)
                    .and_then(|&p| Decimal::try_from(p).ok())
                    .unwrap_or(h.average_price);
                h.market_value(price)
            })
            .sum()
    }

    /// Cash plus market value of holdings.
    pub fn total_value(&self, prices: &HashMap<String, f64>) -> Decimal {
        self.cash_balance + self.holdings_value(prices)
    }
}
