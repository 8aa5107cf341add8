//! SQLite-backed store.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use stockdesk_core::error::StoreError;
use stockdesk_core::traits::{AccountStore, HoldingChange, LedgerCommit, PortfolioStore};
use stockdesk_core::types::{
    Account, Holding, NewAccount, Portfolio, Role, Side, Transaction, TRANSACTION_WINDOW,
};
use tracing::{debug, info};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        role TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS portfolios (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE REFERENCES users(id),
        cash_balance TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS holdings (
        portfolio_id INTEGER NOT NULL REFERENCES portfolios(id),
        symbol TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        average_price TEXT NOT NULL,
        PRIMARY KEY (portfolio_id, symbol)
    );
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        portfolio_id INTEGER NOT NULL REFERENCES portfolios(id),
        side TEXT NOT NULL,
        symbol TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        price TEXT NOT NULL,
        timestamp TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_portfolio ON transactions(portfolio_id, id);";

/// Store on a pooled SQLite database.
///
/// Money is stored as decimal text and timestamps as RFC 3339, so values
/// read back compare equal to what was written.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: impl AsRef<Path>, pool_size: u32) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path.as_ref())
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)
            .map_err(|e: r2d2::Error| StoreError::Unavailable(e.to_string()))?;

        let store = Self { pool };
        store.initialize_schema()?;
        info!(path = %path.as_ref().display(), pool_size, "Opened SQLite store");
        Ok(store)
    }

    /// Private in-memory database; a single connection so all calls share it.
    pub fn in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| StoreError::Unavailable(e.to_string()))?;

        let store = Self { pool };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(SCHEMA).map_err(query_err)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| StoreError::Unavailable(e.to_string()))
    }

    /// Number of stored transactions of a portfolio, beyond the loaded window.
    pub fn transaction_count(&self, portfolio_id: i64) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn()?
            .query_row(
                "SELECT COUNT(*) FROM transactions WHERE portfolio_id = ?1",
                params![portfolio_id],
                |row| row.get(0),
            )
            .map_err(query_err)?;
        Ok(count as usize)
    }
}

fn query_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn parse_decimal(raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str(raw).map_err(|e| StoreError::Corrupt(format!("decimal {raw:?}: {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("timestamp {raw:?}: {e}")))
}

fn write_cash(conn: &Connection, portfolio_id: i64, amount: Decimal) -> Result<(), StoreError> {
    let updated = conn
        .execute(
            "UPDATE portfolios SET cash_balance = ?1 WHERE id = ?2",
            params![amount.to_string(), portfolio_id],
        )
        .map_err(query_err)?;
    if updated == 0 {
        return Err(StoreError::Database(format!(
            "portfolio {portfolio_id} does not exist"
        )));
    }
    Ok(())
}

fn write_holding(
    conn: &Connection,
    portfolio_id: i64,
    symbol: &str,
    quantity: i64,
    average_price: Decimal,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO holdings (portfolio_id, symbol, quantity, average_price)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (portfolio_id, symbol)
         DO UPDATE SET quantity = excluded.quantity, average_price = excluded.average_price",
        params![portfolio_id, symbol, quantity, average_price.to_string()],
    )
    .map_err(query_err)?;
    Ok(())
}

fn remove_holding(conn: &Connection, portfolio_id: i64, symbol: &str) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM holdings WHERE portfolio_id = ?1 AND symbol = ?2",
        params![portfolio_id, symbol],
    )
    .map_err(query_err)?;
    Ok(())
}

fn write_transaction(
    conn: &Connection,
    portfolio_id: i64,
    transaction: &Transaction,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO transactions (portfolio_id, side, symbol, quantity, price, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            portfolio_id,
            transaction.side.as_str(),
            transaction.symbol,
            transaction.quantity,
            transaction.price.to_string(),
            transaction.timestamp.to_rfc3339(),
        ],
    )
    .map_err(query_err)?;
    Ok(())
}

impl PortfolioStore for SqliteStore {
    fn load_portfolio(&self, user_id: i64) -> Result<Portfolio, StoreError> {
        let conn = self.conn()?;

        let (id, cash): (i64, String) = conn
            .query_row(
                "SELECT id, cash_balance FROM portfolios WHERE user_id = ?1",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(query_err)?
            .ok_or(StoreError::PortfolioNotFound { user_id })?;

        let mut portfolio = Portfolio::new(id, user_id, parse_decimal(&cash)?);

        let mut stmt = conn
            .prepare(
                "SELECT symbol, quantity, average_price FROM holdings
                 WHERE portfolio_id = ?1 ORDER BY symbol",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(query_err)?;
        for row in rows {
            let (symbol, quantity, average) = row.map_err(query_err)?;
            let holding = Holding::new(symbol.as_str(), quantity, parse_decimal(&average)?);
            portfolio.holdings.insert(symbol, holding);
        }

        let mut stmt = conn
            .prepare(
                "SELECT side, symbol, quantity, price, timestamp FROM transactions
                 WHERE portfolio_id = ?1 ORDER BY id DESC LIMIT ?2",
            )
            .map_err(query_err)?;
        let rows = stmt
            .query_map(params![id, TRANSACTION_WINDOW as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(query_err)?;

        let mut recent = Vec::new();
        for row in rows {
            let (side, symbol, quantity, price, timestamp) = row.map_err(query_err)?;
            let side = Side::from_str(&side).map_err(StoreError::Corrupt)?;
            recent.push(Transaction::new(
                side,
                symbol,
                quantity,
                parse_decimal(&price)?,
                parse_timestamp(&timestamp)?,
            ));
        }
        // Newest first from the query; replay oldest first.
        for transaction in recent.into_iter().rev() {
            portfolio.record_transaction(transaction);
        }

        debug!(user_id, portfolio_id = id, "Loaded portfolio");
        Ok(portfolio)
    }

    fn save_cash_balance(&self, portfolio_id: i64, amount: Decimal) -> Result<(), StoreError> {
        let conn = self.conn()?;
        write_cash(&conn, portfolio_id, amount)
    }

    fn upsert_holding(
        &self,
        portfolio_id: i64,
        symbol: &str,
        quantity: i64,
        average_price: Decimal,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        write_holding(&conn, portfolio_id, symbol, quantity, average_price)
    }

    fn delete_holding(&self, portfolio_id: i64, symbol: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        remove_holding(&conn, portfolio_id, symbol)
    }

    fn append_transaction(
        &self,
        portfolio_id: i64,
        transaction: &Transaction,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        write_transaction(&conn, portfolio_id, transaction)
    }

    fn commit(&self, portfolio_id: i64, commit: &LedgerCommit) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        write_cash(&tx, portfolio_id, commit.cash_balance)?;
        match &commit.holding {
            HoldingChange::Upsert {
                symbol,
                quantity,
                average_price,
            } => write_holding(&tx, portfolio_id, symbol, *quantity, *average_price)?,
            HoldingChange::Delete { symbol } => remove_holding(&tx, portfolio_id, symbol)?,
        }
        write_transaction(&tx, portfolio_id, &commit.transaction)?;

        tx.commit().map_err(query_err)
    }
}

impl AccountStore for SqliteStore {
    fn create_account(
        &self,
        account: &NewAccount,
        starting_cash: Decimal,
    ) -> Result<Account, StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        tx.execute(
            "INSERT INTO users (username, name, email, role) VALUES (?1, ?2, ?3, ?4)",
            params![
                account.username,
                account.name,
                account.email,
                account.role.as_str()
            ],
        )
        .map_err(|e| match e.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => {
                StoreError::AccountExists(account.username.clone())
            }
            _ => query_err(e),
        })?;
        let user_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO portfolios (user_id, cash_balance) VALUES (?1, ?2)",
            params![user_id, starting_cash.to_string()],
        )
        .map_err(query_err)?;
        tx.commit().map_err(query_err)?;

        info!(username = %account.username, user_id, "Created account");
        Ok(Account {
            id: user_id,
            username: account.username.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
        })
    }

    fn find_account(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let row = self
            .conn()?
            .query_row(
                "SELECT id, username, name, email, role FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(query_err)?;

        row.map(|(id, username, name, email, role)| {
            Ok(Account {
                id,
                username,
                name,
                email,
                role: Role::from_str(&role).map_err(StoreError::Corrupt)?,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn account(store: &SqliteStore, username: &str) -> Account {
        store
            .create_account(&NewAccount::trader(username, "x@example.com"), dec!(10000))
            .unwrap()
    }

    #[test]
    fn test_create_and_find_account() {
        let store = SqliteStore::in_memory().unwrap();
        let created = account(&store, "bob");

        assert_eq!(store.find_account("bob").unwrap(), Some(created.clone()));
        assert_eq!(store.find_account("nobody").unwrap(), None);
        assert_eq!(
            store.create_account(&NewAccount::trader("bob", "y@example.com"), dec!(1)),
            Err(StoreError::AccountExists("bob".to_string()))
        );

        let portfolio = store.load_portfolio(created.id).unwrap();
        assert_eq!(portfolio.cash_balance, dec!(10000));
        assert_eq!(portfolio.holding_count(), 0);
    }

    #[test]
    fn test_commit_persists_exact_values() {
        let store = SqliteStore::in_memory().unwrap();
        let user = account(&store, "carol");
        let portfolio = store.load_portfolio(user.id).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let tx = Transaction::new(Side::Buy, "AAPL", 3, dec!(150.33), at);

        store
            .commit(
                portfolio.id,
                &LedgerCommit {
                    cash_balance: dec!(9548.01),
                    holding: HoldingChange::Upsert {
                        symbol: "AAPL".to_string(),
                        quantity: 3,
                        average_price: dec!(150.33),
                    },
                    transaction: tx.clone(),
                    previous_cash: dec!(10000),
                    previous_holding: HoldingChange::Delete {
                        symbol: "AAPL".to_string(),
                    },
                },
            )
            .unwrap();

        let loaded = store.load_portfolio(user.id).unwrap();
        assert_eq!(loaded.cash_balance, dec!(9548.01));
        assert_eq!(loaded.holding("AAPL").unwrap().average_price, dec!(150.33));
        assert_eq!(loaded.recent_transactions(5), vec![&tx]);
    }

    #[test]
    fn test_failed_commit_writes_nothing() {
        let store = SqliteStore::in_memory().unwrap();
        let user = account(&store, "dave");
        let portfolio = store.load_portfolio(user.id).unwrap();
        let tx = Transaction::new(Side::Buy, "AAPL", 1, dec!(1), Utc::now());

        // Unknown portfolio id: the cash update touches no row and aborts.
        let result = store.commit(
            portfolio.id + 100,
            &LedgerCommit {
                cash_balance: dec!(0),
                holding: HoldingChange::Delete {
                    symbol: "AAPL".to_string(),
                },
                transaction: tx,
                previous_cash: dec!(10000),
                previous_holding: HoldingChange::Delete {
                    symbol: "AAPL".to_string(),
                },
            },
        );
        assert!(result.is_err());
        assert_eq!(store.transaction_count(portfolio.id + 100).unwrap(), 0);
        assert_eq!(store.load_portfolio(user.id).unwrap().cash_balance, dec!(10000));
    }

    #[test]
    fn test_primitive_writes_each_use_a_pooled_connection() {
        let store = SqliteStore::in_memory().unwrap();
        let user = account(&store, "fred");
        let id = store.load_portfolio(user.id).unwrap().id;

        store.save_cash_balance(id, dec!(4321.5)).unwrap();
        store.upsert_holding(id, "AMD", 3, dec!(99.5)).unwrap();
        store.upsert_holding(id, "AMD", 5, dec!(101)).unwrap();
        store.upsert_holding(id, "INTC", 1, dec!(30)).unwrap();
        store.delete_holding(id, "INTC").unwrap();
        let tx = Transaction::new(Side::Buy, "AMD", 5, dec!(101), Utc::now());
        store.append_transaction(id, &tx).unwrap();

        let loaded = store.load_portfolio(user.id).unwrap();
        assert_eq!(loaded.cash_balance, dec!(4321.5));
        assert_eq!(loaded.holding("AMD"), Some(&Holding::new("AMD", 5, dec!(101))));
        assert!(loaded.holding("INTC").is_none());
        assert_eq!(store.transaction_count(id).unwrap(), 1);

        assert!(store.save_cash_balance(id + 100, dec!(1)).is_err());
    }

    #[test]
    fn test_load_returns_most_recent_window() {
        let store = SqliteStore::in_memory().unwrap();
        let user = account(&store, "erin");
        let portfolio = store.load_portfolio(user.id).unwrap();

        for n in 1..=(TRANSACTION_WINDOW as i64 + 5) {
            let tx = Transaction::new(Side::Buy, "MSFT", n, dec!(2), Utc::now());
            store.append_transaction(portfolio.id, &tx).unwrap();
        }
        store.delete_holding(portfolio.id, "MSFT").unwrap();

        let loaded = store.load_portfolio(user.id).unwrap();
        let recent = loaded.recent_transactions(usize::MAX);
        assert_eq!(recent.len(), TRANSACTION_WINDOW);
        assert_eq!(recent[0].quantity, TRANSACTION_WINDOW as i64 + 5);
        assert_eq!(recent[TRANSACTION_WINDOW - 1].quantity, 6);
        assert_eq!(
            store.transaction_count(portfolio.id).unwrap(),
            TRANSACTION_WINDOW + 5
        );
    }
}
