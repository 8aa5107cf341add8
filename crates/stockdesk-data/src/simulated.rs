//! Simulated quote source.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use stockdesk_core::error::DataError;
use stockdesk_core::traits::QuoteSource;
use stockdesk_core::types::Quote;

/// Length of the history attached to every quote.
pub const DEFAULT_HISTORY_DAYS: usize = 30;

/// Artificial delay before each quote is returned.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(100);

/// Quote source producing reproducible prices from a seeded random walk.
///
/// Output is a pure function of the symbol and the seed: the same symbol
/// fetched twice from sources with the same seed yields identical quotes.
#[derive(Debug, Clone)]
pub struct SimulatedQuoteSource {
    seed: u64,
    history_days: usize,
    latency: Duration,
}

impl SimulatedQuoteSource {
    /// Create a source with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            history_days: DEFAULT_HISTORY_DAYS,
            latency: DEFAULT_LATENCY,
        }
    }

    /// Set the history length attached to quotes.
    pub fn with_history_days(mut self, days: usize) -> Self {
        self.history_days = days;
        self
    }

    /// Set the simulated request latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ symbol_seed(symbol))
    }

    fn base_price(rng: &mut StdRng) -> f64 {
        50.0 + rng.gen::<f64>() * 450.0
    }

    /// Generate the snapshot for a symbol without any delay.
    pub fn generate_quote(&self, symbol: &str) -> Quote {
        let mut rng = self.rng_for(symbol);
        let base = Self::base_price(&mut rng);

        Quote {
            symbol: symbol.to_string(),
            name: company_name(symbol),
            current_price: base,
            open_price: base * (0.95 + rng.gen::<f64>() * 0.1),
            high_price: base * (1.0 + rng.gen::<f64>() * 0.05),
            low_price: base * (0.95 + rng.gen::<f64>() * 0.05),
            volume: 1_000_000 + rng.gen_range(0..9_000_000u64),
            historical_prices: self.generate_history(symbol, self.history_days),
        }
    }

    /// Random walk of `days` daily prices.
    ///
    /// The walk itself is unbounded; each emitted price is floored at 1.
    pub fn generate_history(&self, symbol: &str, days: usize) -> Vec<f64> {
        let mut rng = self.rng_for(symbol);
        let mut walk = Self::base_price(&mut rng);

        (0..days)
            .map(|_| {
                walk += (rng.gen::<f64>() - 0.5) * 10.0;
                walk.max(1.0)
            })
            .collect()
    }
}

impl Default for SimulatedQuoteSource {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl QuoteSource for SimulatedQuoteSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        validate_symbol(symbol)?;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.generate_quote(symbol))
    }

    async fn historical_prices(&self, symbol: &str, days: usize) -> Result<Vec<f64>, DataError> {
        validate_symbol(symbol)?;
        Ok(self.generate_history(symbol, days))
    }

    fn name(&self) -> &str {
        "Simulated"
    }
}

fn validate_symbol(symbol: &str) -> Result<(), DataError> {
    let valid = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(DataError::InvalidSymbol(symbol.to_string()))
    }
}

/// Stable 31-multiplier string hash; independent of the std hasher.
fn symbol_seed(symbol: &str) -> u64 {
    symbol
        .bytes()
        .fold(0u64, |hash, b| hash.wrapping_mul(31).wrapping_add(b as u64))
}

fn company_name(symbol: &str) -> String {
    let name = match symbol {
        "AAPL" => "Apple Inc.",
        "GOOGL" => "Alphabet Inc.",
        "MSFT" => "Microsoft Corporation",
        "AMZN" => "Amazon.com Inc.",
        "TSLA" => "Tesla Inc.",
        "META" => "Meta Platforms Inc.",
        "NVDA" => "NVIDIA Corporation",
        "JPM" => "JPMorgan Chase & Co.",
        "V" => "Visa Inc.",
        "WMT" => "Walmart Inc.",
        other => return format!("{other} Corporation"),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_are_reproducible() {
        let a = SimulatedQuoteSource::new(7).generate_quote("AAPL");
        let b = SimulatedQuoteSource::new(7).generate_quote("AAPL");
        assert_eq!(a, b);

        let other_seed = SimulatedQuoteSource::new(8).generate_quote("AAPL");
        assert_ne!(a.current_price, other_seed.current_price);
    }

    #[test]
    fn test_quote_shape() {
        let quote = SimulatedQuoteSource::default().generate_quote("MSFT");

        assert_eq!(quote.name, "Microsoft Corporation");
        assert_eq!(quote.historical_prices.len(), DEFAULT_HISTORY_DAYS);
        assert!((50.0..500.0).contains(&quote.current_price));
        assert!(quote.high_price >= quote.current_price);
        assert!(quote.low_price <= quote.current_price);
        assert!((1_000_000..10_000_000).contains(&quote.volume));
        assert!(quote.historical_prices.iter().all(|&p| p >= 1.0));
    }

    #[test]
    fn test_history_walk_steps_are_bounded() {
        let source = SimulatedQuoteSource::new(3);
        let history = source.generate_history("TSLA", 200);

        assert_eq!(history.len(), 200);
        for pair in history.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 5.0 + 1e-9);
        }
    }

    #[test]
    fn test_floor_does_not_stop_the_walk() {
        let source = SimulatedQuoteSource::new(11);
        let days = 100_000;
        let mut touched_floor = false;

        let symbols = [
            "AAPL", "MSFT", "TSLA", "NVDA", "AMD", "INTC", "F", "GE", "T", "KO", "PEP", "XOM",
        ];
        for symbol in symbols {
            let history = source.generate_history(symbol, days);

            let mut rng = source.rng_for(symbol);
            let mut walk = SimulatedQuoteSource::base_price(&mut rng);
            for &emitted in &history {
                walk += (rng.gen::<f64>() - 0.5) * 10.0;
                assert_eq!(emitted, walk.max(1.0));
                touched_floor |= walk < 1.0;
            }
        }

        assert!(touched_floor, "no walk went below the floor");
    }

    #[test]
    fn test_unknown_company_name() {
        assert_eq!(company_name("XYZ"), "XYZ Corporation");
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_symbol() {
        let source = SimulatedQuoteSource::default().with_latency(Duration::ZERO);

        assert_eq!(
            source.fetch_quote("").await,
            Err(DataError::InvalidSymbol(String::new()))
        );
        assert!(source.fetch_quote("BAD SYMBOL").await.is_err());
        assert!(source.fetch_quote("BRK.B").await.is_ok());
    }

    #[tokio::test]
    async fn test_historical_prices_matches_generator() {
        let source = SimulatedQuoteSource::new(11).with_latency(Duration::ZERO);
        let fetched = source.historical_prices("NVDA", 45).await.unwrap();
        assert_eq!(fetched, source.generate_history("NVDA", 45));
    }
}
