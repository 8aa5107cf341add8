//! Quotes command implementation.

use anyhow::Result;
use std::time::Duration;
use stockdesk_analysis::TrendAnalyzer;
use stockdesk_config::AppConfig;
use stockdesk_data::{simulated_fetcher, FetcherConfig};
use stockdesk_monitor::{render_fetch_summary, render_quotes};
use stockdesk_service::annotate;
use tracing::info;

use super::{normalize_symbol, print_json};
use crate::cli::{OutputFormat, QuotesArgs};

pub async fn run(args: QuotesArgs, config: &AppConfig) -> Result<()> {
    let symbols: Vec<String> = args.symbols.iter().map(|s| normalize_symbol(s)).collect();

    let mut fetcher_config: FetcherConfig = config.fetcher.fetcher_config();
    if let Some(ms) = args.timeout_ms {
        fetcher_config.timeout = Duration::from_millis(ms);
    }
    let fetcher = simulated_fetcher(config.fetcher.simulated_source(), fetcher_config);

    info!(count = symbols.len(), "Fetching quotes");
    let report = fetcher.fetch_quotes(&symbols).await;

    let analyzer = TrendAnalyzer::new();
    let annotated: Vec<_> = report
        .ordered(&symbols)
        .into_iter()
        .map(|quote| annotate(&analyzer, quote))
        .collect();

    match args.output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "quotes": annotated,
            "failures": report.failures,
            "elapsed_ms": report.elapsed.as_millis() as u64,
        }))?,
        OutputFormat::Text => {
            print!("{}", render_quotes(&annotated));
            println!();
            print!("{}", render_fetch_summary(&report));
        }
    }

    Ok(())
}
