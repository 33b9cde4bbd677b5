// Account kind value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Tourist,
    Business,
    Retailer,
}

impl AccountKind {
    /// Lookup order used when the caller does not say which collection an
    /// identifier belongs to.
    pub const RESOLUTION_ORDER: [AccountKind; 3] =
        [AccountKind::Business, AccountKind::Retailer, AccountKind::Tourist];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Tourist => "tourist",
            AccountKind::Business => "business",
            AccountKind::Retailer => "retailer",
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            AccountKind::Tourist => "tourists",
            AccountKind::Business => "businesses",
            AccountKind::Retailer => "retailers",
        }
    }

    pub fn starting_points(&self) -> i64 {
        match self {
            AccountKind::Tourist => 10,
            AccountKind::Business | AccountKind::Retailer => 0,
        }
    }

    pub fn has_address(&self) -> bool {
        !matches!(self, AccountKind::Tourist)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "tourist" | "tourists" => Some(AccountKind::Tourist),
            "business" | "businesses" => Some(AccountKind::Business),
            "retailer" | "retailers" => Some(AccountKind::Retailer),
            _ => None,
        }
    }
}
