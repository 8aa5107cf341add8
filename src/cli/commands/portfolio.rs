//! Portfolio command implementation.

use anyhow::Result;
use std::collections::HashMap;
use stockdesk_config::AppConfig;
use stockdesk_monitor::{render_fetch_summary, render_portfolio};

use super::print_json;
use crate::cli::session::{fetcher, open_service};
use crate::cli::{OutputFormat, PortfolioArgs};

pub async fn run(args: PortfolioArgs, config: &AppConfig) -> Result<()> {
    let service = open_service(config, &args.user)?;
    let snapshot = service.ledger().snapshot();

    let report = if args.offline || snapshot.holdings.is_empty() {
        None
    } else {
        Some(service.refresh(&fetcher(config), &snapshot.symbols()).await)
    };
    let prices: HashMap<String, f64> = snapshot
        .symbols()
        .into_iter()
        .filter_map(|s| service.quote(&s).map(|q| (s, q.current_price)))
        .collect();

    match args.output {
        OutputFormat::Json => {
            let recent: Vec<_> = snapshot.recent_transactions(args.transactions);
            print_json(&serde_json::json!({
                "account": service.account(),
                "portfolio_id": snapshot.id,
                "cash_balance": snapshot.cash_balance,
                "holdings": snapshot.holdings,
                "total_value": service.portfolio_value(),
                "recent_transactions": recent,
            }))?
        }
        OutputFormat::Text => {
            println!(
                "Account: {} ({})\n",
                service.account().username,
                service.account().role
            );
            print!("{}", render_portfolio(&snapshot, &prices, args.transactions));
            if let Some(report) = report.filter(|r| !r.is_complete()) {
                println!();
                print!("{}", render_fetch_summary(&report));
            }
        }
    }

    Ok(())
}
