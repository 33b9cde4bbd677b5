use chrono::Utc;
use tracing::{info, warn};

use backend_domain::{
    normalize_optional_text, parse_schedule, AccountKind, NewTransactionRequest, Transaction,
    TransactionType,
};

use crate::identity::require_account;
use crate::{AppError, AppState};

pub(crate) fn new_transaction_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Appends a pickup/dropoff entry to a business log. An unparsable
/// date/time is kept verbatim with no `scheduled_at`.
pub async fn append_transaction(
    state: &AppState,
    business_ref: &str,
    request: NewTransactionRequest,
    created_by: Option<String>,
) -> Result<Transaction, AppError> {
    let business = require_account(state, AccountKind::Business, business_ref).await?;
    let transaction_type =
        TransactionType::normalize(&request.transaction_type).map_err(AppError::BadRequest)?;
    let item_name = request.item_name.trim().to_string();
    if item_name.is_empty() {
        return Err(AppError::BadRequest("item_name is required".to_string()));
    }

    let date = normalize_optional_text(request.date);
    let time = normalize_optional_text(request.time);
    let scheduled_at = parse_schedule(date.as_deref(), time.as_deref());
    if scheduled_at.is_none() && (date.is_some() || time.is_some()) {
        warn!(
            "unparsable schedule date={:?} time={:?} for business '{}'",
            date,
            time,
            business.key()
        );
    }

    let transaction = Transaction {
        id: new_transaction_id(),
        business_key: business.key().to_string(),
        business_name: business.name.clone(),
        name: normalize_optional_text(request.name),
        item_name,
        qr_code_id: normalize_optional_text(request.qr_code_id),
        transaction_type,
        date,
        time,
        scheduled_at,
        created_at: Utc::now(),
        created_by,
    };
    state.transaction_repo.append_transaction(&transaction).await?;
    info!(
        "{} transaction '{}' recorded for '{}'",
        transaction.transaction_type.as_str(),
        transaction.id,
        business.key()
    );
    Ok(transaction)
}

pub async fn delete_transaction(
    state: &AppState,
    business_ref: &str,
    transaction_id: &str,
) -> Result<(), AppError> {
    let business = require_account(state, AccountKind::Business, business_ref).await?;
    if !state
        .transaction_repo
        .delete_transaction(business.key(), transaction_id.trim())
        .await?
    {
        return Err(AppError::NotFound("Transaction not found".to_string()));
    }
    Ok(())
}
