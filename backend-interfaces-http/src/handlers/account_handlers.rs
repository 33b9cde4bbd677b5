use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::account_commands;
use backend_application::ledger;
use backend_application::queries::account_queries;
use backend_application::AppState;
use backend_domain::{
    Account, AccountKind, NearbyAccount, NearbyQuery, PointsAdjustment, PointsResponse,
    RegisterAccountRequest, RegisterAccountResponse,
};

use crate::error::HttpError;
use crate::middleware::require_admin;

// The collection handlers take a plain `kind`; the router binds it per
// collection and passes the extracted values through.

pub async fn register_account(
    state: AppState,
    kind: AccountKind,
    request: RegisterAccountRequest,
) -> Result<(StatusCode, Json<RegisterAccountResponse>), HttpError> {
    let registered = account_commands::register_account(&state, kind, request).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

pub async fn get_account(
    state: AppState,
    kind: AccountKind,
    identifier: String,
) -> Result<Json<Account>, HttpError> {
    Ok(Json(account_queries::get_account(&state, kind, &identifier).await?))
}

pub async fn delete_account(
    state: AppState,
    headers: HeaderMap,
    kind: AccountKind,
    identifier: String,
) -> Result<StatusCode, HttpError> {
    require_admin(&state.config, &headers)?;
    account_commands::delete_account(&state, kind, &identifier).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_accounts(state: AppState, kind: AccountKind) -> Result<Json<Vec<Account>>, HttpError> {
    Ok(Json(account_queries::list_accounts(&state, kind).await?))
}

pub async fn nearby_accounts(
    state: AppState,
    kind: AccountKind,
    query: NearbyQuery,
) -> Result<Json<Vec<NearbyAccount>>, HttpError> {
    Ok(Json(account_queries::nearby_accounts(&state, kind, query).await?))
}

pub async fn get_points(
    State(state): State<AppState>,
    Path((kind, identifier)): Path<(String, String)>,
) -> Result<Json<PointsResponse>, HttpError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(ledger::get_balance(&state, kind, &identifier).await?))
}

pub async fn adjust_points(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((kind, identifier)): Path<(String, String)>,
    Json(adjustment): Json<PointsAdjustment>,
) -> Result<Json<PointsResponse>, HttpError> {
    require_admin(&state.config, &headers)?;
    let kind = parse_kind(&kind)?;
    let adjusted = ledger::adjust_balance(&state, kind, &identifier, adjustment.delta).await?;
    Ok(Json(adjusted))
}

fn parse_kind(value: &str) -> Result<AccountKind, HttpError> {
    AccountKind::parse(value)
        .ok_or_else(|| HttpError::NotFound(format!("unknown account kind '{value}'")))
}
