//! Buy and sell command implementations.

use anyhow::{Context, Result};
use stockdesk_config::AppConfig;
use stockdesk_core::types::Side;
use stockdesk_monitor::render_trade;
use tracing::warn;

use super::{normalize_symbol, print_json};
use crate::cli::session::{fetcher, open_service};
use crate::cli::{OutputFormat, TradeArgs};

pub async fn run(side: Side, args: TradeArgs, config: &AppConfig) -> Result<()> {
    let service = open_service(config, &args.user)?;
    let symbol = normalize_symbol(&args.symbol);

    let report = service.refresh(&fetcher(config), &[symbol.clone()]).await;
    for failure in &report.failures {
        warn!(symbol = %failure.symbol, "Quote unavailable: {}", failure.failure);
    }

    if args.dry_run {
        let check = match side {
            Side::Buy => service.check_buy(&symbol, args.quantity),
            Side::Sell => service.check_sell(&symbol, args.quantity),
        };
        return match args.output {
            OutputFormat::Json => print_json(&serde_json::json!({
                "side": side,
                "symbol": symbol,
                "quantity": args.quantity,
                "allowed": check.is_ok(),
                "reason": check.as_ref().err().map(|e| e.to_string()),
            })),
            OutputFormat::Text => {
                match &check {
                    Ok(()) => println!("{side} {} {symbol}: would succeed", args.quantity),
                    Err(e) => println!("{side} {} {symbol}: rejected ({e})", args.quantity),
                }
                Ok(())
            }
        };
    }

    let outcome = match side {
        Side::Buy => service.buy(&symbol, args.quantity),
        Side::Sell => service.sell(&symbol, args.quantity),
    }
    .with_context(|| format!("{side} {} {symbol} failed", args.quantity))?;

    match args.output {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => print!("{}", render_trade(&outcome)),
    }

    Ok(())
}
