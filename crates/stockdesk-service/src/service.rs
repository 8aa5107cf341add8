use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use stockdesk_analysis::{rsi, TrendAnalyzer, RSI_PERIOD};
use stockdesk_core::error::{LedgerError, TradeError};
use stockdesk_core::traits::TrendPredictor;
use stockdesk_core::types::{Account, Holding, Prediction, Quote, Transaction};
use stockdesk_data::{FetchReport, QuoteCache, QuoteFetcher};
use stockdesk_ledger::{to_money, Fill, PortfolioLedger};
use tracing::{debug, warn};

use crate::SellPricing;

/// Result of a committed trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeOutcome {
    pub transaction: Transaction,
    /// Cash left after the trade
    pub cash_balance: Decimal,
    /// Fresh prediction for the traded symbol
    pub prediction: Prediction,
}

/// A quote with its derived analytics, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedQuote {
    pub quote: Quote,
    pub prediction: Prediction,
    pub rsi: f64,
}

/// Attach `predictor`'s forecast and the 14-period RSI to a quote.
pub fn annotate(predictor: &dyn TrendPredictor, quote: &Quote) -> AnnotatedQuote {
    AnnotatedQuote {
        quote: quote.clone(),
        prediction: predictor.predict(quote),
        rsi: rsi(&quote.historical_prices, RSI_PERIOD),
    }
}

/// Per-share sell price under `pricing`.
///
/// Falls back to the quote when there is no holding to average.
fn reference_price(
    pricing: SellPricing,
    holding: Option<&Holding>,
    quote: &Quote,
) -> Result<Decimal, LedgerError> {
    match (pricing, holding) {
        (SellPricing::AveragePrice, Some(holding)) => Ok(holding.average_price),
        _ => to_money(&quote.symbol, quote.current_price),
    }
}

/// Coordinates one account's trading session.
pub struct TradingService {
    account: Account,
    ledger: Arc<PortfolioLedger>,
    predictor: Arc<dyn TrendPredictor>,
    quotes: RwLock<QuoteCache>,
    sell_pricing: SellPricing,
}

impl TradingService {
    /// Service using the moving-average trend analyzer and average-price sells.
    pub fn new(account: Account, ledger: Arc<PortfolioLedger>) -> Self {
        Self {
            account,
            ledger,
            predictor: Arc::new(TrendAnalyzer::new()),
            quotes: RwLock::new(QuoteCache::new()),
            sell_pricing: SellPricing::default(),
        }
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn TrendPredictor>) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn with_sell_pricing(mut self, sell_pricing: SellPricing) -> Self {
        self.sell_pricing = sell_pricing;
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn ledger(&self) -> &PortfolioLedger {
        &self.ledger
    }

    pub fn sell_pricing(&self) -> SellPricing {
        self.sell_pricing
    }

    /// Fetch `symbols` and cache every quote that arrived.
    pub async fn refresh(&self, fetcher: &QuoteFetcher, symbols: &[String]) -> FetchReport {
        let report = fetcher.fetch_quotes(symbols).await;
        self.update_quotes(report.quotes.values().cloned());
        report
    }

    /// Replace cached quotes.
    pub fn update_quotes(&self, quotes: impl IntoIterator<Item = Quote>) {
        self.quotes.write().extend(quotes);
    }

    /// Latest cached quote for a symbol.
    pub fn quote(&self, symbol: &str) -> Option<Quote> {
        self.quotes.read().get(symbol).cloned()
    }

    fn require_trader(&self) -> Result<(), TradeError> {
        if self.account.role.can_trade() {
            Ok(())
        } else {
            Err(TradeError::NotPermitted(self.account.username.clone()))
        }
    }

    fn require_quote(&self, symbol: &str) -> Result<Quote, TradeError> {
        self.quote(symbol)
            .ok_or_else(|| TradeError::QuoteUnavailable(symbol.to_string()))
    }

    fn outcome(&self, quote: &Quote, fill: Fill) -> TradeOutcome {
        TradeOutcome {
            transaction: fill.transaction,
            cash_balance: fill.cash_balance,
            prediction: self.predictor.predict(quote),
        }
    }

    /// Buy at the cached quote's current price.
    pub fn buy(&self, symbol: &str, quantity: i64) -> Result<TradeOutcome, TradeError> {
        self.require_trader()?;
        let quote = self.require_quote(symbol)?;
        let fill = self.ledger.fill_buy(&quote, quantity)?;
        Ok(self.outcome(&quote, fill))
    }

    /// Sell at the price chosen by the configured [`SellPricing`].
    ///
    /// The price is resolved against the holding the sale is applied to.
    pub fn sell(&self, symbol: &str, quantity: i64) -> Result<TradeOutcome, TradeError> {
        self.require_trader()?;
        let quote = self.require_quote(symbol)?;
        let pricing = self.sell_pricing;
        let fill = self.ledger.fill_sell(symbol, quantity, |holding| {
            let price = reference_price(pricing, holding, &quote)?;
            debug!(symbol, %price, %pricing, "Resolved sell price");
            Ok(price)
        })?;
        Ok(self.outcome(&quote, fill))
    }

    /// Whether a buy could proceed now.
    pub fn check_buy(&self, symbol: &str, quantity: i64) -> Result<(), TradeError> {
        self.require_trader()?;
        let quote = self.require_quote(symbol)?;
        Ok(self.ledger.check_buy(&quote, quantity)?)
    }

    /// Whether a sell could proceed now.
    pub fn check_sell(&self, symbol: &str, quantity: i64) -> Result<(), TradeError> {
        self.require_trader()?;
        let quote = self.require_quote(symbol)?;
        let pricing = self.sell_pricing;
        Ok(self.ledger.check_sell_with(symbol, quantity, |holding| {
            reference_price(pricing, holding, &quote)
        })?)
    }

    pub fn annotate(&self, quote: &Quote) -> AnnotatedQuote {
        annotate(self.predictor.as_ref(), quote)
    }

    /// Annotated cached quotes for `symbols`, in order, skipping uncached ones.
    pub fn annotated(&self, symbols: &[String]) -> Vec<AnnotatedQuote> {
        let cache = self.quotes.read();
        symbols
            .iter()
            .filter_map(|symbol| match cache.get(symbol) {
                Some(quote) => Some(self.annotate(quote)),
                None => {
                    warn!(symbol = %symbol, "No cached quote");
                    None
                }
            })
            .collect()
    }

    /// Portfolio value against cached quotes.
    pub fn portfolio_value(&self) -> Decimal {
        let prices = self.quotes.read().prices();
        self.ledger.total_value(&prices)
    }
}

impl std::fmt::Debug for TradingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingService")
            .field("account", &self.account.username)
            .field("predictor", &self.predictor.name())
            .field("sell_pricing", &self.sell_pricing)
            .finish_non_exhaustive()
    }
}
