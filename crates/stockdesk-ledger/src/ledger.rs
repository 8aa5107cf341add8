use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use stockdesk_core::error::{LedgerError, StoreError};
use stockdesk_core::traits::{HoldingChange, LedgerCommit, PortfolioStore};
use stockdesk_core::types::{Holding, Portfolio, Quote, Side, Transaction};
use tracing::{error, info, warn};

/// Convert a quote price to ledger money.
///
/// Rejects non-finite prices and prices that are not positive once
/// converted; values below Decimal's resolution round to zero.
pub fn to_money(symbol: &str, price: f64) -> Result<Decimal, LedgerError> {
    let invalid = || LedgerError::InvalidPrice {
        symbol: symbol.to_string(),
        price,
    };
    if !price.is_finite() {
        return Err(invalid());
    }
    match Decimal::try_from(price) {
        Ok(money) if money > Decimal::ZERO => Ok(money),
        _ => Err(invalid()),
    }
}

/// A committed trade and the cash balance it left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub transaction: Transaction,
    pub cash_balance: Decimal,
}

/// Authoritative state of one portfolio.
///
/// Operations on the same ledger are serialized by a per-portfolio lock that
/// is held across the store call. Nothing is changed in memory until the
/// store has accepted the change set.
pub struct PortfolioLedger {
    portfolio: Mutex<Portfolio>,
    store: Arc<dyn PortfolioStore>,
}

impl PortfolioLedger {
    /// Wrap an already loaded portfolio.
    pub fn new(portfolio: Portfolio, store: Arc<dyn PortfolioStore>) -> Self {
        Self {
            portfolio: Mutex::new(portfolio),
            store,
        }
    }

    /// Load the portfolio of `user_id` from the store.
    pub fn open(store: Arc<dyn PortfolioStore>, user_id: i64) -> Result<Self, StoreError> {
        let portfolio = store.load_portfolio(user_id)?;
        info!(
            user_id,
            portfolio_id = portfolio.id,
            cash = %portfolio.cash_balance,
            holdings = portfolio.holding_count(),
            "Portfolio opened"
        );
        Ok(Self::new(portfolio, store))
    }

    pub fn portfolio_id(&self) -> i64 {
        self.portfolio.lock().id
    }

    /// Buy `quantity` shares at the quote's current price.
    pub fn buy(&self, quote: &Quote, quantity: i64) -> Result<Transaction, LedgerError> {
        self.fill_buy(quote, quantity).map(|fill| fill.transaction)
    }

    /// Sell `quantity` shares, crediting `reference_price` per share.
    pub fn sell(
        &self,
        symbol: &str,
        quantity: i64,
        reference_price: Decimal,
    ) -> Result<Transaction, LedgerError> {
        self.fill_sell(symbol, quantity, |_| Ok(reference_price))
            .map(|fill| fill.transaction)
    }

    /// [`buy`](Self::buy), also reporting the resulting cash balance.
    pub fn fill_buy(&self, quote: &Quote, quantity: i64) -> Result<Fill, LedgerError> {
        let mut portfolio = self.portfolio.lock();
        let commit = plan_buy(&portfolio, quote, quantity)
            .map_err(|e| rejected(&portfolio, Side::Buy, &quote.symbol, quantity, e))?;
        self.commit(&mut portfolio, commit)
    }

    /// Sell with the reference price chosen from the current holding.
    ///
    /// `price_for` runs under the portfolio lock, so the holding it sees is
    /// the one the sale is applied to.
    pub fn fill_sell<F>(
        &self,
        symbol: &str,
        quantity: i64,
        price_for: F,
    ) -> Result<Fill, LedgerError>
    where
        F: FnOnce(Option<&Holding>) -> Result<Decimal, LedgerError>,
    {
        let mut portfolio = self.portfolio.lock();
        let commit = price_for(portfolio.holding(symbol))
            .and_then(|price| plan_sell(&portfolio, symbol, quantity, price))
            .map_err(|e| rejected(&portfolio, Side::Sell, symbol, quantity, e))?;
        self.commit(&mut portfolio, commit)
    }

    /// Whether `buy` would pass its guards right now. Changes nothing.
    pub fn check_buy(&self, quote: &Quote, quantity: i64) -> Result<(), LedgerError> {
        plan_buy(&self.portfolio.lock(), quote, quantity).map(|_| ())
    }

    /// Whether `sell` would pass its guards right now. Changes nothing.
    pub fn check_sell(
        &self,
        symbol: &str,
        quantity: i64,
        reference_price: Decimal,
    ) -> Result<(), LedgerError> {
        self.check_sell_with(symbol, quantity, |_| Ok(reference_price))
    }

    /// [`check_sell`](Self::check_sell) with the price chosen as in
    /// [`fill_sell`](Self::fill_sell).
    pub fn check_sell_with<F>(
        &self,
        symbol: &str,
        quantity: i64,
        price_for: F,
    ) -> Result<(), LedgerError>
    where
        F: FnOnce(Option<&Holding>) -> Result<Decimal, LedgerError>,
    {
        let portfolio = self.portfolio.lock();
        let price = price_for(portfolio.holding(symbol))?;
        plan_sell(&portfolio, symbol, quantity, price).map(|_| ())
    }

    /// Cash plus holdings valued at `prices`, average price where missing.
    pub fn total_value(&self, prices: &HashMap<String, f64>) -> Decimal {
        self.portfolio.lock().total_value(prices)
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Portfolio {
        self.portfolio.lock().clone()
    }

    pub fn cash_balance(&self) -> Decimal {
        self.portfolio.lock().cash_balance
    }

    pub fn holding(&self, symbol: &str) -> Option<Holding> {
        self.portfolio.lock().holding(symbol).cloned()
    }

    /// Up to `limit` most recent transactions, newest first.
    pub fn recent_transactions(&self, limit: usize) -> Vec<Transaction> {
        self.portfolio
            .lock()
            .recent_transactions(limit)
            .into_iter()
            .cloned()
            .collect()
    }

    fn commit(
        &self,
        portfolio: &mut Portfolio,
        commit: LedgerCommit,
    ) -> Result<Fill, LedgerError> {
        if let Err(e) = self.store.commit(portfolio.id, &commit) {
            error!(
                portfolio_id = portfolio.id,
                side = %commit.transaction.side,
                symbol = %commit.transaction.symbol,
                error = %e,
                "Persistence failed, trade rolled back"
            );
            return Err(LedgerError::Persistence(e));
        }

        apply(portfolio, &commit);
        let transaction = commit.transaction;
        info!(
            portfolio_id = portfolio.id,
            side = %transaction.side,
            symbol = %transaction.symbol,
            quantity = transaction.quantity,
            price = %transaction.price,
            cash = %portfolio.cash_balance,
            "Trade committed"
        );
        Ok(Fill {
            transaction,
            cash_balance: portfolio.cash_balance,
        })
    }
}

impl std::fmt::Debug for PortfolioLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioLedger")
            .field("portfolio", &*self.portfolio.lock())
            .finish_non_exhaustive()
    }
}

fn rejected(
    portfolio: &Portfolio,
    side: Side,
    symbol: &str,
    quantity: i64,
    e: LedgerError,
) -> LedgerError {
    warn!(
        portfolio_id = portfolio.id,
        side = %side,
        symbol,
        quantity,
        reason = %e,
        "Trade rejected"
    );
    e
}

/// Never earlier than the last recorded transaction.
fn next_timestamp(portfolio: &Portfolio) -> DateTime<Utc> {
    let now = Utc::now();
    match portfolio.last_transaction_at() {
        Some(last) if last > now => last,
        _ => now,
    }
}

fn notional(price: Decimal, quantity: i64) -> Result<Decimal, LedgerError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or(LedgerError::InvalidQuantity(quantity))
}

/// Holding change that puts `symbol` back the way it is now.
fn current_holding(portfolio: &Portfolio, symbol: &str) -> HoldingChange {
    match portfolio.holding(symbol) {
        Some(h) => HoldingChange::Upsert {
            symbol: h.symbol.clone(),
            quantity: h.quantity,
            average_price: h.average_price,
        },
        None => HoldingChange::Delete {
            symbol: symbol.to_string(),
        },
    }
}

fn plan_buy(
    portfolio: &Portfolio,
    quote: &Quote,
    quantity: i64,
) -> Result<LedgerCommit, LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::InvalidQuantity(quantity));
    }
    let price = to_money(&quote.symbol, quote.current_price)?;
    let total_cost = notional(price, quantity)?;

    if portfolio.cash_balance < total_cost {
        return Err(LedgerError::InsufficientFunds {
            required: total_cost,
            available: portfolio.cash_balance,
        });
    }

    let holding = match portfolio.holding(&quote.symbol) {
        Some(existing) => {
            let mut updated = existing.clone();
            updated.add(quantity, price);
            updated
        }
        None => Holding::new(quote.symbol.as_str(), quantity, price),
    };

    Ok(LedgerCommit {
        cash_balance: portfolio.cash_balance - total_cost,
        holding: HoldingChange::Upsert {
            symbol: holding.symbol,
            quantity: holding.quantity,
            average_price: holding.average_price,
        },
        transaction: Transaction::new(
            Side::Buy,
            quote.symbol.as_str(),
            quantity,
            price,
            next_timestamp(portfolio),
        ),
        previous_cash: portfolio.cash_balance,
        previous_holding: current_holding(portfolio, &quote.symbol),
    })
}

fn plan_sell(
    portfolio: &Portfolio,
    symbol: &str,
    quantity: i64,
    reference_price: Decimal,
) -> Result<LedgerCommit, LedgerError> {
    if quantity <= 0 {
        return Err(LedgerError::InvalidQuantity(quantity));
    }

    let held = portfolio.quantity_of(symbol);
    if held < quantity {
        return Err(LedgerError::InsufficientShares {
            symbol: symbol.to_string(),
            requested: quantity,
            held,
        });
    }
    if reference_price <= Decimal::ZERO {
        return Err(LedgerError::InvalidPrice {
            symbol: symbol.to_string(),
            price: reference_price.to_f64().unwrap_or_default(),
        });
    }
    let proceeds = notional(reference_price, quantity)?;

    let remaining = held - quantity;
    let holding = match portfolio.holding(symbol) {
        Some(existing) if remaining > 0 => HoldingChange::Upsert {
            symbol: symbol.to_string(),
            quantity: remaining,
            average_price: existing.average_price,
        },
        _ => HoldingChange::Delete {
            symbol: symbol.to_string(),
        },
    };

    Ok(LedgerCommit {
        cash_balance: portfolio.cash_balance + proceeds,
        holding,
        transaction: Transaction::new(
            Side::Sell,
            symbol,
            quantity,
            reference_price,
            next_timestamp(portfolio),
        ),
        previous_cash: portfolio.cash_balance,
        previous_holding: current_holding(portfolio, symbol),
    })
}

fn apply(portfolio: &mut Portfolio, commit: &LedgerCommit) {
    portfolio.cash_balance = commit.cash_balance;
    match &commit.holding {
        HoldingChange::Upsert {
            symbol,
            quantity,
            average_price,
        } => {
            portfolio.holdings.insert(
                symbol.clone(),
                Holding::new(symbol.as_str(), *quantity, *average_price),
            );
        }
        HoldingChange::Delete { symbol } => {
            portfolio.holdings.remove(symbol);
        }
    }
    portfolio.record_transaction(commit.transaction.clone());
}
