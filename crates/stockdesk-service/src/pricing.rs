use serde::{Deserialize, Serialize};

/// Which price a sale is credited at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SellPricing {
    /// The holding's average acquisition price
    #[default]
    AveragePrice,
    /// The cached quote's current price
    LastQuote,
}

impl std::fmt::Display for SellPricing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SellPricing::AveragePrice => write!(f, "average_price"),
            SellPricing::LastQuote => write!(f, "last_quote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&SellPricing::LastQuote).unwrap(),
            "\"last_quote\""
        );
        let parsed: SellPricing = serde_json::from_str("\"average_price\"").unwrap();
        assert_eq!(parsed, SellPricing::default());
    }
}
