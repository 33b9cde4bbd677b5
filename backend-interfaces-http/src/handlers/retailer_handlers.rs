use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use backend_application::commands::item_commands;
use backend_application::AppState;
use backend_domain::{CreateItemResponse, RetailerItemQuery, ScanQuery, ScanResponse};

use crate::error::HttpError;

pub async fn create_retailer_item(
    State(state): State<AppState>,
    Query(query): Query<RetailerItemQuery>,
) -> Result<(StatusCode, Json<CreateItemResponse>), HttpError> {
    let created = item_commands::create_retailer_item(&state, query).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn scan_item_qr(
    State(state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ScanResponse>, HttpError> {
    Ok(Json(item_commands::scan_item(&state, query).await?))
}
