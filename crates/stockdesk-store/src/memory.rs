//! In-memory store.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use stockdesk_core::error::StoreError;
use stockdesk_core::traits::{AccountStore, HoldingChange, LedgerCommit, PortfolioStore};
use stockdesk_core::types::{
    Account, Holding, NewAccount, Portfolio, Transaction, TRANSACTION_WINDOW,
};
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredPortfolio {
    user_id: i64,
    cash_balance: Decimal,
    holdings: BTreeMap<String, Holding>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    accounts: HashMap<String, Account>,
    portfolios: BTreeMap<i64, StoredPortfolio>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn portfolio_mut(&mut self, portfolio_id: i64) -> Result<&mut StoredPortfolio, StoreError> {
        self.portfolios
            .get_mut(&portfolio_id)
            .ok_or_else(|| StoreError::Database(format!("portfolio {portfolio_id} does not exist")))
    }
}

/// Process-local store.
///
/// Writes can be switched off with [`MemoryStore::set_available`] to exercise
/// the ledger's failure handling. `commit` applies a change set atomically.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// When false, every write fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }

    /// Create a portfolio for `user_id` without an account record.
    pub fn open_portfolio(&self, user_id: i64, cash_balance: Decimal) -> Portfolio {
        let mut inner = self.inner.lock();
        let id = inner.next_id();
        inner.portfolios.insert(
            id,
            StoredPortfolio {
                user_id,
                cash_balance,
                holdings: BTreeMap::new(),
                transactions: Vec::new(),
            },
        );
        Portfolio::new(id, user_id, cash_balance)
    }

    /// Stored cash balance of a portfolio.
    pub fn cash_balance(&self, portfolio_id: i64) -> Option<Decimal> {
        self.inner
            .lock()
            .portfolios
            .get(&portfolio_id)
            .map(|p| p.cash_balance)
    }

    /// Stored holdings of a portfolio, sorted by symbol.
    pub fn holdings(&self, portfolio_id: i64) -> Vec<Holding> {
        self.inner
            .lock()
            .portfolios
            .get(&portfolio_id)
            .map(|p| p.holdings.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Full stored history of a portfolio, oldest first.
    pub fn transactions(&self, portfolio_id: i64) -> Vec<Transaction> {
        self.inner
            .lock()
            .portfolios
            .get(&portfolio_id)
            .map(|p| p.transactions.clone())
            .unwrap_or_default()
    }
}

impl PortfolioStore for MemoryStore {
    fn load_portfolio(&self, user_id: i64) -> Result<Portfolio, StoreError> {
        let inner = self.inner.lock();
        let (&id, stored) = inner
            .portfolios
            .iter()
            .find(|(_, p)| p.user_id == user_id)
            .ok_or(StoreError::PortfolioNotFound { user_id })?;

        let mut portfolio = Portfolio::new(id, user_id, stored.cash_balance);
        for holding in stored.holdings.values() {
            portfolio
                .holdings
                .insert(holding.symbol.clone(), holding.clone());
        }
        let skip = stored.transactions.len().saturating_sub(TRANSACTION_WINDOW);
        for transaction in stored.transactions.iter().skip(skip) {
            portfolio.record_transaction(transaction.clone());
        }
        Ok(portfolio)
    }

    fn save_cash_balance(&self, portfolio_id: i64, amount: Decimal) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner.lock().portfolio_mut(portfolio_id)?.cash_balance = amount;
        Ok(())
    }

    fn upsert_holding(
        &self,
        portfolio_id: i64,
        symbol: &str,
        quantity: i64,
        average_price: Decimal,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner.lock().portfolio_mut(portfolio_id)?.holdings.insert(
            symbol.to_string(),
            Holding::new(symbol, quantity, average_price),
        );
        Ok(())
    }

    fn delete_holding(&self, portfolio_id: i64, symbol: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner
            .lock()
            .portfolio_mut(portfolio_id)?
            .holdings
            .remove(symbol);
        Ok(())
    }

    fn append_transaction(
        &self,
        portfolio_id: i64,
        transaction: &Transaction,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner
            .lock()
            .portfolio_mut(portfolio_id)?
            .transactions
            .push(transaction.clone());
        Ok(())
    }

    fn commit(&self, portfolio_id: i64, commit: &LedgerCommit) -> Result<(), StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        let stored = inner.portfolio_mut(portfolio_id)?;

        stored.cash_balance = commit.cash_balance;
        match &commit.holding {
            HoldingChange::Upsert {
                symbol,
                quantity,
                average_price,
            } => {
                stored.holdings.insert(
                    symbol.clone(),
                    Holding::new(symbol.as_str(), *quantity, *average_price),
                );
            }
            HoldingChange::Delete { symbol } => {
                stored.holdings.remove(symbol);
            }
        }
        stored.transactions.push(commit.transaction.clone());

        debug!(portfolio_id, "Committed change set to memory store");
        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn create_account(
        &self,
        account: &NewAccount,
        starting_cash: Decimal,
    ) -> Result<Account, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock();
        if inner.accounts.contains_key(&account.username) {
            return Err(StoreError::AccountExists(account.username.clone()));
        }

        let created = Account {
            id: inner.next_id(),
            username: account.username.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        };
        let portfolio_id = inner.next_id();
        inner.portfolios.insert(
            portfolio_id,
            StoredPortfolio {
                user_id: created.id,
                cash_balance: starting_cash,
                holdings: BTreeMap::new(),
                transactions: Vec::new(),
            },
        );
        inner
            .accounts
            .insert(created.username.clone(), created.clone());

        Ok(created)
    }

    fn find_account(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.lock().accounts.get(username).cloned())
    }
}
