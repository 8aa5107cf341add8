//! Error types for the stockdesk system.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum StockdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Trade error: {0}")]
    Trade(#[from] TradeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a ledger buy/sell operation.
///
/// None of these leave a partially applied operation behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid quantity: {0} (must be positive)")]
    InvalidQuantity(i64),

    #[error("Invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: f64 },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Insufficient shares of {symbol}: requested {requested}, held {held}")]
    InsufficientShares {
        symbol: String,
        requested: i64,
        held: i64,
    },

    #[error("Persistence failed, operation rolled back: {0}")]
    Persistence(#[from] StoreError),
}

/// Persistence collaborator errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("No portfolio for user {user_id}")]
    PortfolioNotFound { user_id: i64 },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Quote source errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Trading service errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("No quote available for {0}")]
    QuoteUnavailable(String),

    #[error("Account {0} is not permitted to trade")]
    NotPermitted(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type alias for stockdesk operations.
pub type StockdeskResult<T> = Result<T, StockdeskError>;
