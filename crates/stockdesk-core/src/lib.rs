//! Core types and contracts for the stockdesk portfolio system.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Quote) and trend predictions
//! - Portfolio, holding, transaction and account types
//! - Contracts for quote sources, trend predictors and persistence backends

pub mod error;
pub mod traits;
pub mod types;

pub use error::{StockdeskError, StockdeskResult};
pub use traits::*;
pub use types::*;
