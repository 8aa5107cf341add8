//! Account records.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Role tag carried by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Trader,
    Viewer,
}

impl Role {
    /// Whether accounts with this role may place buy/sell orders.
    pub fn can_trade(&self) -> bool {
        matches!(self, Role::Trader)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Trader => "TRADER",
            Role::Viewer => "VIEWER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRADER" => Ok(Role::Trader),
            "VIEWER" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user account. Each account owns exactly one portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Fields needed to open an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl NewAccount {
    /// A trader account whose display name defaults to the username.
    pub fn trader(username: impl Into<String>, email: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            name: username.clone(),
            username,
            email: email.into(),
            role: Role::Trader,
        }
    }
}
