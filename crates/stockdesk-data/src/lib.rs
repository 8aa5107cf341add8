//! Quote sources and concurrent quote fetching.

mod cache;
mod fetcher;
mod simulated;

pub use cache::QuoteCache;
pub use fetcher::{
    FetchFailure, FetchReport, FetcherConfig, QuoteFetcher, SymbolFailure, DEFAULT_POOL_SIZE,
    DEFAULT_TIMEOUT,
};
pub use simulated::{SimulatedQuoteSource, DEFAULT_HISTORY_DAYS, DEFAULT_LATENCY};

use std::sync::Arc;
use stockdesk_core::traits::QuoteSource;

/// Fetcher over the simulated source.
pub fn simulated_fetcher(source: SimulatedQuoteSource, config: FetcherConfig) -> QuoteFetcher {
    let source: Arc<dyn QuoteSource> = Arc::new(source);
    QuoteFetcher::new(source, config)
}
