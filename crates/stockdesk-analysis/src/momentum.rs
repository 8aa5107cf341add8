//! Momentum indicators.

/// Default RSI lookback.
pub const RSI_PERIOD: usize = 14;

/// Lookback used by [`momentum`].
const MOMENTUM_PERIOD: usize = 5;

/// Relative change over the last `min(5, len)` points.
///
/// Returns 0 for fewer than two points.
pub fn momentum(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let period = MOMENTUM_PERIOD.min(prices.len());
    let old_price = prices[prices.len() - period];
    let new_price = prices[prices.len() - 1];

    (new_price - old_price) / old_price
}

/// Trend-continuation estimate: `current_price * (1 + momentum)`.
pub fn predict_next_price(current_price: f64, prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return current_price;
    }
    current_price * (1.0 + momentum(prices))
}

/// Relative Strength Index over the last `period` price changes.
///
/// Measures the balance of recent gains against losses. Returns the neutral
/// value 50 when there are fewer than `period + 1` points, and 100 when the
/// window contains no losses.
pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return 50.0;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in prices.len() - period..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    if losses == 0.0 {
        return 100.0;
    }

    let period_f64 = period as f64;
    let rs = (gains / period_f64) / (losses / period_f64);
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
