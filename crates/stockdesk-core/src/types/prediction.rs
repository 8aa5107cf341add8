//! Trend prediction types.

use serde::{Deserialize, Serialize};

/// Direction label produced by a trend predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Neutral,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Up => write!(f, "UP"),
            Trend::Down => write!(f, "DOWN"),
            Trend::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Derived forecast for a quote. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub trend: Trend,
    pub predicted_next_price: f64,
    /// In [0.5, 0.95]
    pub confidence: f64,
}
