//! Moving-average crossover trend classification.

use serde::{Deserialize, Serialize};
use stockdesk_core::traits::TrendPredictor;
use stockdesk_core::types::{Quote, Trend};

use crate::momentum::predict_next_price;
use crate::moving_average::moving_average;

/// Series shorter than this get the floor confidence.
const CONFIDENCE_MIN_POINTS: usize = 10;
/// Most recent transitions inspected by the confidence walk.
const CONFIDENCE_LOOKBACK: usize = 9;
const CONFIDENCE_FLOOR: f64 = 0.5;
const CONFIDENCE_STEP: f64 = 0.08;
const CONFIDENCE_CAP: f64 = 0.95;

/// Golden/death cross trend analyzer.
///
/// Compares a short moving average with a long one; the trend is UP when the
/// short average exceeds the long one by more than `band`, DOWN when it is
/// below by more than `band`, NEUTRAL otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalyzer {
    short_period: usize,
    long_period: usize,
    band: f64,
}

impl TrendAnalyzer {
    /// Create an analyzer with the default parameters (5, 10, 2%).
    pub fn new() -> Self {
        Self::with_periods(5, 10, 0.02)
    }

    /// Create an analyzer with custom periods and dead band.
    pub fn with_periods(short_period: usize, long_period: usize, band: f64) -> Self {
        assert!(short_period > 0 && long_period > 0);
        assert!(
            short_period < long_period,
            "Short period must be less than long period"
        );
        assert!(band >= 0.0, "Band must not be negative");
        Self {
            short_period,
            long_period,
            band,
        }
    }

    /// Points needed before a non-neutral trend can be reported.
    pub fn min_points(&self) -> usize {
        self.long_period
    }

    /// Classify the series.
    pub fn trend(&self, prices: &[f64]) -> Trend {
        if prices.len() < self.long_period {
            return Trend::Neutral;
        }

        let (Ok(short_ma), Ok(long_ma)) = (
            moving_average(prices, self.short_period),
            moving_average(prices, self.long_period),
        ) else {
            return Trend::Neutral;
        };

        if short_ma > long_ma * (1.0 + self.band) {
            Trend::Up
        } else if short_ma < long_ma * (1.0 - self.band) {
            Trend::Down
        } else {
            Trend::Neutral
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendPredictor for TrendAnalyzer {
    fn predict_trend(&self, prices: &[f64]) -> Trend {
        self.trend(prices)
    }

    fn predict_next_price(&self, quote: &Quote) -> f64 {
        predict_next_price(quote.current_price, &quote.historical_prices)
    }

    fn confidence_score(&self, prices: &[f64]) -> f64 {
        confidence_score(prices)
    }

    fn name(&self) -> &str {
        "ma_crossover"
    }
}

/// Trend with the default 5/10 crossover and 2% band.
pub fn predict_trend(prices: &[f64]) -> Trend {
    TrendAnalyzer::new().trend(prices)
}

/// Confidence from the run of same-direction moves at the end of the series.
///
/// The direction is that of the last move (a flat move counts as down). The
/// run is counted backwards over at most the last 9 transitions and mapped to
/// `min(0.5 + 0.08 * run, 0.95)`.
pub fn confidence_score(prices: &[f64]) -> f64 {
    if prices.len() < CONFIDENCE_MIN_POINTS {
        return CONFIDENCE_FLOOR;
    }

    let last = prices.len() - 1;
    let rising = prices[last] > prices[last - 1];

    let consecutive = (0..CONFIDENCE_LOOKBACK)
        .map(|offset| last - offset)
        .take_while(|&i| (prices[i] > prices[i - 1]) == rising)
        .count();

    (CONFIDENCE_FLOOR + consecutive as f64 * CONFIDENCE_STEP).min(CONFIDENCE_CAP)
}
