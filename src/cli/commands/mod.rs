//! CLI command implementations.

pub mod account;
pub mod portfolio;
pub mod quotes;
pub mod trade;
pub mod validate;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Symbols are matched case-insensitively and stored upper case.
pub(crate) fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}
