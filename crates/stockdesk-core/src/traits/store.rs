//! Persistence collaborator contracts.

use crate::error::StoreError;
use crate::types::{Account, NewAccount, Portfolio, Transaction};
use rust_decimal::Decimal;

/// Resulting state of the one holding touched by a ledger operation.
#[derive(Debug, Clone, PartialEq)]
pub enum HoldingChange {
    /// Holding exists after the operation with this quantity and average.
    Upsert {
        symbol: String,
        quantity: i64,
        average_price: Decimal,
    },
    /// Holding was sold out.
    Delete { symbol: String },
}

/// Everything one buy or sell writes to durable storage.
///
/// Carries the values it replaces so that a backend writing the parts one
/// at a time can put them back when a later write fails.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerCommit {
    pub cash_balance: Decimal,
    pub holding: HoldingChange,
    pub transaction: Transaction,
    /// Cash balance before the operation.
    pub previous_cash: Decimal,
    /// How to restore the touched holding.
    pub previous_holding: HoldingChange,
}

fn write_holding<S>(
    store: &S,
    portfolio_id: i64,
    change: &HoldingChange,
) -> Result<(), StoreError>
where
    S: PortfolioStore + ?Sized,
{
    match change {
        HoldingChange::Upsert {
            symbol,
            quantity,
            average_price,
        } => store.upsert_holding(portfolio_id, symbol, *quantity, *average_price),
        HoldingChange::Delete { symbol } => store.delete_holding(portfolio_id, symbol),
    }
}

/// Durable storage of portfolios.
///
/// Every call may fail with a [`StoreError`]; the ledger treats any failure
/// as fatal to the operation in progress.
pub trait PortfolioStore: Send + Sync {
    /// Load the portfolio owned by `user_id`, with its most recent
    /// transactions.
    fn load_portfolio(&self, user_id: i64) -> Result<Portfolio, StoreError>;

    /// Overwrite the cash balance.
    fn save_cash_balance(&self, portfolio_id: i64, amount: Decimal) -> Result<(), StoreError>;

    /// Insert or replace a holding.
    fn upsert_holding(
        &self,
        portfolio_id: i64,
        symbol: &str,
        quantity: i64,
        average_price: Decimal,
    ) -> Result<(), StoreError>;

    /// Remove a holding.
    fn delete_holding(&self, portfolio_id: i64, symbol: &str) -> Result<(), StoreError>;

    /// Append to the full transaction history.
    fn append_transaction(
        &self,
        portfolio_id: i64,
        transaction: &Transaction,
    ) -> Result<(), StoreError>;

    /// Apply a ledger change set, all of it or none of it.
    ///
    /// Backends with transactions should override this. The default writes
    /// cash, holding and transaction in order; when the holding or the
    /// transaction write fails it restores the previous holding and cash and
    /// returns the original error.
    fn commit(&self, portfolio_id: i64, commit: &LedgerCommit) -> Result<(), StoreError> {
        self.save_cash_balance(portfolio_id, commit.cash_balance)?;

        let rest = write_holding(self, portfolio_id, &commit.holding)
            .and_then(|()| self.append_transaction(portfolio_id, &commit.transaction));
        if let Err(e) = rest {
            // Undo in reverse order.
            let restored = write_holding(self, portfolio_id, &commit.previous_holding)
                .and_then(|()| self.save_cash_balance(portfolio_id, commit.previous_cash));
            return Err(match restored {
                Ok(()) => e,
                Err(undo) => StoreError::Database(format!(
                    "{e}; restoring previous state failed: {undo}"
                )),
            });
        }
        Ok(())
    }
}

/// Account registry. Authentication is handled elsewhere.
pub trait AccountStore: Send + Sync {
    /// Create an account together with its portfolio.
    fn create_account(
        &self,
        account: &NewAccount,
        starting_cash: Decimal,
    ) -> Result<Account, StoreError>;

    /// Look an account up by username.
    fn find_account(&self, username: &str) -> Result<Option<Account>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Holding, Side};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Store with only the primitive calls, failing the ones named in `fail`.
    #[derive(Default)]
    struct PrimitiveStore {
        cash: Mutex<Decimal>,
        holdings: Mutex<HashMap<String, Holding>>,
        transactions: Mutex<Vec<Transaction>>,
        fail: Mutex<Vec<&'static str>>,
    }

    impl PrimitiveStore {
        fn failing(&self, call: &'static str) -> Result<(), StoreError> {
            if self.fail.lock().unwrap().contains(&call) {
                Err(StoreError::Database(format!("{call} refused")))
            } else {
                Ok(())
            }
        }
    }

    impl PortfolioStore for PrimitiveStore {
        fn load_portfolio(&self, user_id: i64) -> Result<Portfolio, StoreError> {
            Err(StoreError::PortfolioNotFound { user_id })
        }

        fn save_cash_balance(&self, _portfolio_id: i64, amount: Decimal) -> Result<(), StoreError> {
            self.failing("cash")?;
            *self.cash.lock().unwrap() = amount;
            Ok(())
        }

        fn upsert_holding(
            &self,
            _portfolio_id: i64,
            symbol: &str,
            quantity: i64,
            average_price: Decimal,
        ) -> Result<(), StoreError> {
            self.failing("upsert")?;
            self.holdings
                .lock()
                .unwrap()
                .insert(symbol.to_string(), Holding::new(symbol, quantity, average_price));
            Ok(())
        }

        fn delete_holding(&self, _portfolio_id: i64, symbol: &str) -> Result<(), StoreError> {
            self.failing("delete")?;
            self.holdings.lock().unwrap().remove(symbol);
            Ok(())
        }

        fn append_transaction(
            &self,
            _portfolio_id: i64,
            transaction: &Transaction,
        ) -> Result<(), StoreError> {
            self.failing("append")?;
            self.transactions.lock().unwrap().push(transaction.clone());
            Ok(())
        }
    }

    fn first_buy() -> LedgerCommit {
        LedgerCommit {
            cash_balance: dec!(8500),
            holding: HoldingChange::Upsert {
                symbol: "AAPL".to_string(),
                quantity: 10,
                average_price: dec!(150),
            },
            transaction: Transaction::new(Side::Buy, "AAPL", 10, dec!(150), Utc::now()),
            previous_cash: dec!(10000),
            previous_holding: HoldingChange::Delete {
                symbol: "AAPL".to_string(),
            },
        }
    }

    fn store_with_cash(cash: Decimal) -> PrimitiveStore {
        let store = PrimitiveStore::default();
        *store.cash.lock().unwrap() = cash;
        store
    }

    #[test]
    fn test_default_commit_writes_everything() {
        let store = store_with_cash(dec!(10000));
        store.commit(1, &first_buy()).unwrap();

        assert_eq!(*store.cash.lock().unwrap(), dec!(8500));
        assert_eq!(store.holdings.lock().unwrap()["AAPL"].quantity, 10);
        assert_eq!(store.transactions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_default_commit_restores_cash_when_holding_write_fails() {
        let store = store_with_cash(dec!(10000));
        store.fail.lock().unwrap().push("upsert");

        let result = store.commit(1, &first_buy());
        assert_eq!(result, Err(StoreError::Database("upsert refused".to_string())));
        assert_eq!(*store.cash.lock().unwrap(), dec!(10000));
        assert!(store.holdings.lock().unwrap().is_empty());
        assert!(store.transactions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_default_commit_restores_holding_when_append_fails() {
        let store = store_with_cash(dec!(8500));
        store
            .holdings
            .lock()
            .unwrap()
            .insert("AAPL".to_string(), Holding::new("AAPL", 10, dec!(150)));
        store.fail.lock().unwrap().push("append");

        let second_buy = LedgerCommit {
            cash_balance: dec!(6900),
            holding: HoldingChange::Upsert {
                symbol: "AAPL".to_string(),
                quantity: 20,
                average_price: dec!(155),
            },
            transaction: Transaction::new(Side::Buy, "AAPL", 10, dec!(160), Utc::now()),
            previous_cash: dec!(8500),
            previous_holding: HoldingChange::Upsert {
                symbol: "AAPL".to_string(),
                quantity: 10,
                average_price: dec!(150),
            },
        };
        assert!(store.commit(1, &second_buy).is_err());

        assert_eq!(*store.cash.lock().unwrap(), dec!(8500));
        assert_eq!(
            store.holdings.lock().unwrap()["AAPL"],
            Holding::new("AAPL", 10, dec!(150))
        );
    }

    #[test]
    fn test_default_commit_reports_failed_restore() {
        let store = store_with_cash(dec!(10000));
        store.fail.lock().unwrap().extend(["upsert", "delete"]);

        match store.commit(1, &first_buy()) {
            Err(StoreError::Database(msg)) => {
                assert!(msg.contains("upsert refused"));
                assert!(msg.contains("restoring previous state failed"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
