use tracing::{error, warn};

use backend_domain::{
    Account, AccountKind, DeltaOutcome, PointsResponse, SideEffect, BALANCE_FLOOR,
};

use crate::identity::{display_kind, require_account};
use crate::{AppError, AppState};

pub async fn get_balance(
    state: &AppState,
    kind: AccountKind,
    identifier: &str,
) -> Result<PointsResponse, AppError> {
    let account = require_account(state, kind, identifier).await?;
    Ok(PointsResponse {
        account: account.identity.key,
        kind,
        points: account.points,
    })
}

/// Admin correction; no floor, so balances may go negative.
pub async fn adjust_balance(
    state: &AppState,
    kind: AccountKind,
    identifier: &str,
    delta: i64,
) -> Result<PointsResponse, AppError> {
    let account = require_account(state, kind, identifier).await?;
    let balance = apply(state, &account, delta, None).await?;
    warn!(
        "admin adjusted {} '{}' by {} (balance {})",
        kind.as_str(),
        account.key(),
        delta,
        balance
    );
    Ok(PointsResponse {
        account: account.identity.key,
        kind,
        points: balance,
    })
}

/// Debits `amount`, refusing to go below the balance floor.
pub(crate) async fn debit(state: &AppState, account: &Account, amount: i64) -> Result<i64, AppError> {
    apply(state, account, -amount, Some(BALANCE_FLOOR)).await
}

pub(crate) async fn credit(state: &AppState, account: &Account, amount: i64) -> Result<i64, AppError> {
    apply(state, account, amount, None).await
}

/// Credit whose failure is reported instead of propagated. Every outcome
/// other than `Applied` is logged and counted as a side-effect failure.
pub(crate) async fn credit_best_effort(
    state: &AppState,
    kind: AccountKind,
    key: &str,
    amount: i64,
) -> SideEffect {
    let error = match state.account_repo.apply_delta(kind, key, amount, None).await {
        Ok(DeltaOutcome::Applied { .. }) => return SideEffect::Applied,
        Ok(DeltaOutcome::NotFound) => {
            format!("{} '{}' no longer exists", display_kind(kind), key)
        }
        Ok(DeltaOutcome::Insufficient { balance }) => {
            format!("credit refused at balance {balance}")
        }
        Ok(DeltaOutcome::Overflow { balance }) => {
            format!("credit would overflow balance {balance}")
        }
        Err(err) => format!("{err:#}"),
    };
    warn!("credit of {} to {} '{}' failed: {}", amount, kind.as_str(), key, error);
    state.metrics.record_side_effect_failure();
    SideEffect::failed(error)
}

/// Reverses a delta applied before a lost race. Failures are only logged.
pub(crate) async fn compensate(state: &AppState, account: &Account, delta: i64) {
    if let Err(err) = state
        .account_repo
        .apply_delta(account.kind, account.key(), delta, None)
        .await
    {
        error!(
            "compensating delta {} on {} '{}' failed: {}",
            delta,
            account.kind.as_str(),
            account.key(),
            err
        );
        state.metrics.record_side_effect_failure();
    }
}

async fn apply(
    state: &AppState,
    account: &Account,
    delta: i64,
    floor: Option<i64>,
) -> Result<i64, AppError> {
    let outcome = state
        .account_repo
        .apply_delta(account.kind, account.key(), delta, floor)
        .await?;
    match outcome {
        DeltaOutcome::Applied { balance } => Ok(balance),
        DeltaOutcome::Insufficient { balance } => Err(AppError::BadRequest(format!(
            "Not enough points. You need {} points but have {}.",
            -delta, balance
        ))),
        DeltaOutcome::Overflow { balance } => Err(AppError::BadRequest(format!(
            "Adjustment of {delta} is out of range for balance {balance}."
        ))),
        DeltaOutcome::NotFound => Err(AppError::NotFound(format!(
            "{} not found",
            display_kind(account.kind)
        ))),
    }
}
