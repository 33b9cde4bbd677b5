use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::auth::verify_token;
use backend_application::commands::transaction_commands;
use backend_application::queries::transaction_queries;
use backend_application::AppState;
use backend_domain::{BusinessIdentifierQuery, NewTransactionRequest, Transaction, TransactionList};

use crate::error::HttpError;
use crate::middleware::{extract_bearer, require_admin};

pub async fn append_transaction_by_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BusinessIdentifierQuery>,
    Json(request): Json<NewTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    append(&state, &headers, &query.identifier, request).await
}

pub async fn list_transactions_by_query(
    State(state): State<AppState>,
    Query(query): Query<BusinessIdentifierQuery>,
) -> Result<Json<TransactionList>, HttpError> {
    let list = transaction_queries::list_transactions(&state, &query.identifier).await?;
    Ok(Json(list))
}

pub async fn append_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(business): Path<String>,
    Json(request): Json<NewTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    append(&state, &headers, &business, request).await
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(business): Path<String>,
) -> Result<Json<TransactionList>, HttpError> {
    let list = transaction_queries::list_transactions(&state, &business).await?;
    Ok(Json(list))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((business, transaction_id)): Path<(String, String)>,
) -> Result<StatusCode, HttpError> {
    require_admin(&state.config, &headers)?;
    transaction_commands::delete_transaction(&state, &business, &transaction_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A bearer token is optional here; when present it must verify and its UID
/// is stored as the submitter.
async fn append(
    state: &AppState,
    headers: &HeaderMap,
    business: &str,
    request: NewTransactionRequest,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    let created_by = match extract_bearer(headers) {
        Some(token) => Some(verify_token(state, &token).await?.uid),
        None => None,
    };
    let transaction =
        transaction_commands::append_transaction(state, business, request, created_by).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}
