//! Quote source trait definition.

use crate::error::DataError;
use crate::types::Quote;
use async_trait::async_trait;

/// Trait for quote providers.
///
/// Implementations must be safe to call concurrently for different symbols.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current snapshot for a symbol, history included.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, DataError>;

    /// Fetch `days` daily prices for a symbol, oldest first.
    async fn historical_prices(&self, symbol: &str, days: usize) -> Result<Vec<f64>, DataError>;

    /// Get the source name.
    fn name(&self) -> &str;
}
