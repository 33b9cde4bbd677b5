// Transaction type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Pickup,
    Dropoff,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Pickup => "Pickup",
            TransactionType::Dropoff => "Dropoff",
        }
    }

    /// Canonicalizes free-form input such as `"pick up"` or `"DROP-OFF"`.
    pub fn normalize(value: &str) -> Result<Self, String> {
        let compact = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|ch| !ch.is_whitespace() && *ch != '-' && *ch != '_')
            .collect::<String>();
        match compact.as_str() {
            "pickup" => Ok(TransactionType::Pickup),
            "dropoff" => Ok(TransactionType::Dropoff),
            _ => Err(format!(
                "invalid transaction_type '{}', expected Pickup or Dropoff",
                value.trim()
            )),
        }
    }
}
