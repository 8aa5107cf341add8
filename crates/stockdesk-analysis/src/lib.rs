//! Trend analytics over historical price series.
//!
//! This crate provides pure functions over a chronological price series
//! (oldest first):
//! - Moving averages over a trailing window
//! - Momentum, next-price estimate and RSI
//! - Moving-average crossover trend classification and its confidence score
//!
//! [`TrendAnalyzer`] bundles the trend heuristics behind the
//! [`stockdesk_core::TrendPredictor`] contract.

pub mod momentum;
pub mod moving_average;
pub mod trend;

pub use momentum::{momentum, predict_next_price, rsi, RSI_PERIOD};
pub use moving_average::moving_average;
pub use trend::{confidence_score, predict_trend, TrendAnalyzer};
