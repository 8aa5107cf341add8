//! Transaction records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Trade side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Storage/display code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

/// An executed buy or sell. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub side: Side,
    pub symbol: String,
    pub quantity: i64,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        side: Side,
        symbol: impl Into<String>,
        quantity: i64,
        price: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            side,
            symbol: symbol.into(),
            quantity,
            price,
            timestamp,
        }
    }

    /// quantity * price
    pub fn total_amount(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} @ ${:.2} ({})",
            self.side,
            self.quantity,
            self.symbol,
            self.price,
            self.timestamp.format("%Y-%m-%d %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_amount() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let tx = Transaction::new(Side::Buy, "AAPL", 10, dec!(150.25), ts);

        assert_eq!(tx.total_amount(), dec!(1502.50));
        assert_eq!(tx.to_string(), "BUY 10 AAPL @ $150.25 (2024-01-15 10:30)");
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("BUY".parse::<Side>(), Ok(Side::Buy));
        assert_eq!("sell".parse::<Side>(), Ok(Side::Sell));
        assert!("HOLD".parse::<Side>().is_err());
    }
}
