//! Plain-text console reports.

use rust_decimal::Decimal;
use std::collections::HashMap;
use stockdesk_core::types::Portfolio;
use stockdesk_data::FetchReport;
use stockdesk_service::{AnnotatedQuote, TradeOutcome};

const RULE: &str = "───────────────────────────────────────────────────────────────────────\n";

/// Quote table with trend, next-price estimate, confidence and RSI.
pub fn render_quotes(quotes: &[AnnotatedQuote]) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "{:<8} {:<24} {:>10} {:>8} {:>8} {:>10} {:>5} {:>6}\n",
        "SYMBOL", "NAME", "PRICE", "CHG %", "TREND", "NEXT", "CONF", "RSI"
    ));
    s.push_str(RULE);

    for a in quotes {
        let q = &a.quote;
        s.push_str(&format!(
            "{:<8} {:<24} {:>10.2} {:>+8.2} {:>8} {:>10.2} {:>5.2} {:>6.1}\n",
            q.symbol,
            truncate(&q.name, 24),
            q.current_price,
            q.change_percent(),
            a.prediction.trend.to_string(),
            a.prediction.predicted_next_price,
            a.prediction.confidence,
            a.rsi,
        ));
    }

    s
}

/// Cash, holdings valued at `prices` and the most recent transactions.
pub fn render_portfolio(
    portfolio: &Portfolio,
    prices: &HashMap<String, f64>,
    transactions: usize,
) -> String {
    let mut s = String::new();

    s.push_str(&format!("PORTFOLIO #{}\n", portfolio.id));
    s.push_str(RULE);
    s.push_str(&format!("  Cash:           ${:.2}\n", portfolio.cash_balance));
    s.push_str(&format!(
        "  Holdings value: ${:.2}\n",
        portfolio.holdings_value(prices)
    ));
    s.push_str(&format!(
        "  Total value:    ${:.2}\n\n",
        portfolio.total_value(prices)
    ));

    if portfolio.holdings.is_empty() {
        s.push_str("  No holdings\n");
    } else {
        s.push_str(&format!(
            "  {:<8} {:>8} {:>12} {:>12} {:>14}\n",
            "SYMBOL", "QTY", "AVG PRICE", "PRICE", "VALUE"
        ));
        for symbol in portfolio.symbols() {
            let Some(holding) = portfolio.holding(&symbol) else {
                continue;
            };
            let price = prices
                .get(&symbol)
                .and_then(|&p| Decimal::try_from(p).ok())
                .unwrap_or(holding.average_price);
            s.push_str(&format!(
                "  {:<8} {:>8} {:>12.2} {:>12.2} {:>14.2}\n",
                holding.symbol,
                holding.quantity,
                holding.average_price,
                price,
                holding.market_value(price)
            ));
        }
    }

    let recent = portfolio.recent_transactions(transactions);
    if !recent.is_empty() {
        s.push('\n');
        s.push_str("RECENT TRANSACTIONS\n");
        s.push_str(RULE);
        for tx in recent {
            s.push_str(&format!("  {tx}\n"));
        }
    }

    s
}

/// One-line trade confirmation plus the prediction.
pub fn render_trade(outcome: &TradeOutcome) -> String {
    format!(
        "{}  (total ${:.2}, cash ${:.2})\nOutlook: {} next ${:.2} confidence {:.2}\n",
        outcome.transaction,
        outcome.transaction.total_amount(),
        outcome.cash_balance,
        outcome.prediction.trend,
        outcome.prediction.predicted_next_price,
        outcome.prediction.confidence,
    )
}

/// Fetch counts and one line per missing symbol.
pub fn render_fetch_summary(report: &FetchReport) -> String {
    let mut s = format!(
        "Fetched {} quote(s) in {} ms ({} timed out, {} failed)\n",
        report.quotes.len(),
        report.elapsed.as_millis(),
        report.timeout_count(),
        report.error_count()
    );
    for failure in &report.failures {
        s.push_str(&format!("  {:<8} {}\n", failure.symbol, failure.failure));
    }
    s
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
