//! Portfolio ledger.
//!
//! A [`PortfolioLedger`] owns the in-memory state of one portfolio and
//! writes every change through to a [`PortfolioStore`]. Buy and sell either
//! apply completely, in memory and in the store, or not at all.
//!
//! [`PortfolioStore`]: stockdesk_core::traits::PortfolioStore

mod ledger;

pub use ledger::{to_money, Fill, PortfolioLedger};
