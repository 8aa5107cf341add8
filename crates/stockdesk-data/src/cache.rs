//! Latest-quote cache.

use std::collections::HashMap;
use stockdesk_core::types::Quote;

/// Simple in-memory cache of the most recent quote per symbol.
#[derive(Debug, Clone, Default)]
pub struct QuoteCache {
    quotes: HashMap<String, Quote>,
}

impl QuoteCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached quote for a symbol.
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    /// Store a quote, replacing any older one for the same symbol.
    pub fn put(&mut self, quote: Quote) {
        self.quotes.insert(quote.symbol.clone(), quote);
    }

    /// Store many quotes.
    pub fn extend(&mut self, quotes: impl IntoIterator<Item = Quote>) {
        for quote in quotes {
            self.put(quote);
        }
    }

    /// Current price per cached symbol.
    pub fn prices(&self) -> HashMap<String, f64> {
        self.quotes
            .iter()
            .map(|(symbol, quote)| (symbol.clone(), quote.current_price))
            .collect()
    }

    /// Clear cache for a symbol.
    pub fn clear(&mut self, symbol: &str) {
        self.quotes.remove(symbol);
    }

    /// Clear all cached quotes.
    pub fn clear_all(&mut self) {
        self.quotes.clear();
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
