use backend_domain::{sort_by_schedule, AccountKind, TransactionList};

use crate::identity::require_account;
use crate::{AppError, AppState};

/// Entries ordered by schedule, unscheduled ones first.
pub async fn list_transactions(
    state: &AppState,
    business_ref: &str,
) -> Result<TransactionList, AppError> {
    let business = require_account(state, AccountKind::Business, business_ref).await?;
    let mut transactions = state
        .transaction_repo
        .list_transactions(business.key())
        .await?;
    sort_by_schedule(&mut transactions);
    Ok(TransactionList {
        business: business.identity.key,
        transactions,
    })
}
