//! Trend predictor trait definition.

use crate::types::{Prediction, Quote, Trend};

/// Strategy that turns a price history into a forecast.
pub trait TrendPredictor: Send + Sync {
    /// Classify the direction of a price series (oldest first).
    fn predict_trend(&self, prices: &[f64]) -> Trend;

    /// Estimate the next price of a quote.
    fn predict_next_price(&self, quote: &Quote) -> f64;

    /// Confidence in the current trend, in [0.5, 0.95].
    fn confidence_score(&self, prices: &[f64]) -> f64;

    /// Get the predictor name.
    fn name(&self) -> &str;

    /// Full prediction for a quote.
    fn predict(&self, quote: &Quote) -> Prediction {
        Prediction {
            trend: self.predict_trend(&quote.historical_prices),
            predicted_next_price: self.predict_next_price(quote),
            confidence: self.confidence_score(&quote.historical_prices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat;

    impl TrendPredictor for Flat {
        fn predict_trend(&self, _prices: &[f64]) -> Trend {
            Trend::Neutral
        }

        fn predict_next_price(&self, quote: &Quote) -> f64 {
            quote.current_price
        }

        fn confidence_score(&self, _prices: &[f64]) -> f64 {
            0.5
        }

        fn name(&self) -> &str {
            "flat"
        }
    }

    #[test]
    fn test_default_predict_combines_parts() {
        let quote = Quote::new("AAPL", "Apple Inc.", 150.0).with_history(vec![1.0, 2.0]);
        let prediction = Flat.predict(&quote);

        assert_eq!(prediction.trend, Trend::Neutral);
        assert_eq!(prediction.predicted_next_price, 150.0);
        assert_eq!(prediction.confidence, 0.5);
    }
}
