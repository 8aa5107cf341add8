//! Core data types for the stockdesk system.

mod account;
mod portfolio;
mod prediction;
mod quote;
mod transaction;

pub use account::{Account, NewAccount, Role};
pub use portfolio::{Holding, Portfolio, DEFAULT_STARTING_CASH, TRANSACTION_WINDOW};
pub use prediction::{Prediction, Trend};
pub use quote::Quote;
pub use transaction::{Side, Transaction};
