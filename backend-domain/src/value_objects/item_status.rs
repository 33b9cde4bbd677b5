// Item status value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Unavailable,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Unavailable => "unavailable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "available" => Some(ItemStatus::Available),
            "unavailable" => Some(ItemStatus::Unavailable),
            _ => None,
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an item entered the registry. The two flows start in opposite states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOrigin {
    /// Listed by a business or retailer, ready for pickup.
    Listing,
    /// Donated by a tourist, held until the business confirms receipt.
    Donation,
}

impl ItemOrigin {
    pub fn initial_status(&self) -> ItemStatus {
        match self {
            ItemOrigin::Listing => ItemStatus::Available,
            ItemOrigin::Donation => ItemStatus::Unavailable,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "listing" | "retailer" => Some(ItemOrigin::Listing),
            "donation" => Some(ItemOrigin::Donation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOrigin::Listing => "listing",
            ItemOrigin::Donation => "donation",
        }
    }
}
