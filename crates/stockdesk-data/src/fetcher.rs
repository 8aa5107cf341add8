//! Concurrent quote fetching with a bounded worker pool.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stockdesk_core::traits::QuoteSource;
use stockdesk_core::types::Quote;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Maximum number of source calls in flight at once.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Per-call deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fetcher configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Worker pool size
    pub pool_size: usize,
    /// Deadline for one source call, measured once it starts executing
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Why a symbol is missing from a [`FetchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FetchFailure {
    /// The source did not answer before the deadline.
    Timeout,
    /// The source returned an error or its task died.
    Error(String),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchFailure::Timeout => write!(f, "timed out"),
            FetchFailure::Error(msg) => write!(f, "{msg}"),
        }
    }
}

/// A symbol that could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub failure: FetchFailure,
}

/// Outcome of a multi-symbol fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Successfully fetched quotes, keyed by requested symbol
    pub quotes: HashMap<String, Quote>,
    /// Symbols that timed out or failed
    pub failures: Vec<SymbolFailure>,
    /// Wall-clock time of the whole fetch
    pub elapsed: Duration,
}

impl FetchReport {
    /// Number of symbols that timed out.
    pub fn timeout_count(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.failure == FetchFailure::Timeout)
            .count()
    }

    /// Number of symbols that failed with an error.
    pub fn error_count(&self) -> usize {
        self.failures.len() - self.timeout_count()
    }

    /// True when every requested symbol was fetched.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fetched quotes in the order of `symbols`, skipping missing ones.
    pub fn ordered(&self, symbols: &[String]) -> Vec<&Quote> {
        symbols.iter().filter_map(|s| self.quotes.get(s)).collect()
    }
}

/// Runs quote source calls concurrently across a symbol list.
///
/// A failure or timeout of one symbol never affects the others; such symbols
/// are simply absent from the returned map and listed as failures.
#[derive(Clone)]
pub struct QuoteFetcher {
    source: Arc<dyn QuoteSource>,
    config: FetcherConfig,
}

impl QuoteFetcher {
    /// Create a fetcher. A pool size of zero is treated as one.
    pub fn new(source: Arc<dyn QuoteSource>, config: FetcherConfig) -> Self {
        let config = FetcherConfig {
            pool_size: config.pool_size.max(1),
            ..config
        };
        Self { source, config }
    }

    /// Get the effective configuration.
    pub fn config(&self) -> FetcherConfig {
        self.config
    }

    /// Fetch quotes for all `symbols`.
    ///
    /// Duplicate symbols are fetched once. Returns after every call has
    /// completed, failed or timed out; a timed-out call is dropped and any
    /// later result is discarded.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> FetchReport {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.pool_size));
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::new();
        let mut seen = HashSet::new();

        for symbol in symbols {
            if !seen.insert(symbol.as_str()) {
                continue;
            }

            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.config.timeout;
            let task_symbol = symbol.clone();

            let handle = tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| FetchFailure::Error(e.to_string()))?;
                fetch_with_deadline(source.as_ref(), &task_symbol, timeout).await
            });
            in_flight.insert(handle.id(), symbol.clone());
        }

        let mut report = FetchReport::default();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => (e.id(), Err(FetchFailure::Error(format!("fetch task failed: {e}")))),
            };
            let Some(symbol) = in_flight.remove(&id) else {
                continue;
            };

            match outcome {
                Ok(quote) => {
                    debug!(symbol = %symbol, price = quote.current_price, "Quote fetched");
                    report.quotes.insert(symbol, quote);
                }
                Err(failure) => {
                    warn!(symbol = %symbol, source = self.source.name(), "Quote fetch failed: {}", failure);
                    report.failures.push(SymbolFailure { symbol, failure });
                }
            }
        }

        report.elapsed = started.elapsed();
        info!(
            fetched = report.quotes.len(),
            timed_out = report.timeout_count(),
            failed = report.error_count(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Quote refresh complete"
        );

        report
    }

    /// Fetch a single quote under the same deadline.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, FetchFailure> {
        fetch_with_deadline(self.source.as_ref(), symbol, self.config.timeout).await
    }
}

async fn fetch_with_deadline(
    source: &dyn QuoteSource,
    symbol: &str,
    timeout: Duration,
) -> Result<Quote, FetchFailure> {
    match tokio::time::timeout(timeout, source.fetch_quote(symbol)).await {
        Ok(Ok(quote)) => Ok(quote),
        Ok(Err(e)) => Err(FetchFailure::Error(e.to_string())),
        Err(_) => Err(FetchFailure::Timeout),
    }
}

impl std::fmt::Debug for QuoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteFetcher")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .finish()
    }
}
