//! Account creation command.

use anyhow::{Context, Result};
use stockdesk_config::AppConfig;
use stockdesk_core::types::NewAccount;

use super::print_json;
use crate::cli::session::Stores;
use crate::cli::{OpenAccountArgs, OutputFormat};

pub async fn run(args: OpenAccountArgs, config: &AppConfig) -> Result<()> {
    let stores = Stores::open(config)?;
    let new_account = NewAccount {
        name: args.name.unwrap_or_else(|| args.username.clone()),
        username: args.username,
        email: args.email,
        role: args.role.into(),
    };

    let account = stores
        .accounts
        .create_account(&new_account, config.ledger.starting_cash)
        .with_context(|| format!("creating account {}", new_account.username))?;

    match args.output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "account": account,
            "starting_cash": config.ledger.starting_cash,
        }))?,
        OutputFormat::Text => {
            println!(
                "Created {} account {:?} (id {}) with ${:.2}",
                account.role, account.username, account.id, config.ledger.starting_cash
            );
        }
    }

    Ok(())
}
