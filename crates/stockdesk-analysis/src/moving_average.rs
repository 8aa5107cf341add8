//! Moving average over a trailing window.

use stockdesk_core::error::IndicatorError;

/// Arithmetic mean of the last `min(period, prices.len())` values.
///
/// Fails only when `prices` is empty or `period` is zero.
pub fn moving_average(prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "Period must be greater than 0".to_string(),
        ));
    }
    if prices.is_empty() {
        return Err(IndicatorError::InsufficientData {
            required: 1,
            available: 0,
        });
    }

    let window = period.min(prices.len());
    let sum: f64 = prices[prices.len() - window..].iter().sum();
    Ok(sum / window as f64)
}
