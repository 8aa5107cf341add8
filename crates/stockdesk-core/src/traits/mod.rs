//! Contracts implemented by quote sources, predictors and storage backends.

mod predictor;
mod quote_source;
mod store;

pub use predictor::TrendPredictor;
pub use quote_source::QuoteSource;
pub use store::{AccountStore, HoldingChange, LedgerCommit, PortfolioStore};
