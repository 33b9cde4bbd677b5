// Account entity
// Tourist, business and retailer profiles share one shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountIdentity, AccountKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub kind: AccountKind,
    #[serde(flatten)]
    pub identity: AccountIdentity,
    pub name: String,
    pub points: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn key(&self) -> &str {
        &self.identity.key
    }
}

/// Result of an atomic balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    Applied { balance: i64 },
    Insufficient { balance: i64 },
    /// The new balance does not fit in an `i64`; nothing was applied.
    Overflow { balance: i64 },
    NotFound,
}

/// Claims taken from a verified identity-provider token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
}
