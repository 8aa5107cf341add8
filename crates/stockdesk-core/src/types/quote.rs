//! Quote snapshot type.

use serde::{Deserialize, Serialize};

/// A symbol's current price snapshot plus its historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol
    pub symbol: String,
    /// Company name
    pub name: String,
    /// Last traded price
    pub current_price: f64,
    /// Session open
    pub open_price: f64,
    /// Session high
    pub high_price: f64,
    /// Session low
    pub low_price: f64,
    /// Shares traded in the session
    pub volume: u64,
    /// Daily prices, oldest first
    pub historical_prices: Vec<f64>,
}

impl Quote {
    /// Create a quote with every session price set to `current_price`.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, current_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            current_price,
            open_price: current_price,
            high_price: current_price,
            low_price: current_price,
            volume: 0,
            historical_prices: Vec::new(),
        }
    }

    /// Attach a historical price series.
    pub fn with_history(mut self, prices: Vec<f64>) -> Self {
        self.historical_prices = prices;
        self
    }

    /// Absolute change since the open.
    pub fn change(&self) -> f64 {
        self.current_price - self.open_price
    }

    /// Change since the open as a percentage of the open.
    pub fn change_percent(&self) -> f64 {
        if self.open_price == 0.0 {
            0.0
        } else {
            self.change() / self.open_price * 100.0
        }
    }
}

impl std::fmt::Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - ${:.2}", self.symbol, self.current_price)
    }
}
