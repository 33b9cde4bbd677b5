// Transaction entity
// Append-only pickup/dropoff record kept under a business

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::TransactionType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub business_key: String,
    pub business_name: String,
    #[serde(default)]
    pub name: Option<String>,
    pub item_name: String,
    #[serde(default)]
    pub qr_code_id: Option<String>,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Orders a business log by scheduled time, unscheduled entries first.
/// The sort is stable so equal keys keep store order.
pub fn sort_by_schedule(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
}
