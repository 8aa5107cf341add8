//! Trading service.
//!
//! Resolves quotes from a session cache, routes buy and sell requests to the
//! portfolio ledger and annotates results with a fresh prediction.

mod pricing;
mod service;

pub use pricing::SellPricing;
pub use service::{annotate, AnnotatedQuote, TradeOutcome, TradingService};
