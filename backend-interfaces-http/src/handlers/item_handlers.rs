use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::item_commands;
use backend_application::queries::item_queries;
use backend_application::AppState;
use backend_domain::{
    CreateItemRequest, CreateItemResponse, DropoffResponse, ImageUpload, Item, ItemOrigin,
    ItemPatch, NearbyItem, NearbyQuery, PickupResponse,
};

use crate::error::HttpError;
use crate::middleware::require_admin;

/// Multipart item creation. `donor` implies the donation flow.
pub async fn create_item(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateItemResponse>), HttpError> {
    let request = read_item_form(multipart).await?;
    let created = item_commands::create_item(&state, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, HttpError> {
    Ok(Json(item_queries::list_items(&state).await?))
}

pub async fn nearby_items(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<NearbyItem>>, HttpError> {
    Ok(Json(item_queries::nearby_items(&state, query).await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(qr_code_id): Path<String>,
) -> Result<Json<Item>, HttpError> {
    Ok(Json(item_queries::get_item(&state, &qr_code_id).await?))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(qr_code_id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, HttpError> {
    let item = item_commands::update_item_metadata(&state, &qr_code_id, patch).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(qr_code_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    require_admin(&state.config, &headers)?;
    item_commands::delete_item(&state, &qr_code_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pickup_item(
    State(state): State<AppState>,
    Path((qr_code_id, tourist)): Path<(String, String)>,
) -> Result<Json<PickupResponse>, HttpError> {
    let picked = item_commands::pickup_item(&state, &qr_code_id, &tourist).await?;
    Ok(Json(picked))
}

pub async fn dropoff_item(
    State(state): State<AppState>,
    Path((qr_code_id, business)): Path<(String, String)>,
) -> Result<Json<DropoffResponse>, HttpError> {
    let dropped = item_commands::dropoff_item(&state, &qr_code_id, &business).await?;
    Ok(Json(dropped))
}

async fn read_item_form(mut multipart: Multipart) -> Result<CreateItemRequest, HttpError> {
    let mut request = CreateItemRequest::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| HttpError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| HttpError::BadRequest(format!("invalid image: {err}")))?;
            if !bytes.is_empty() {
                request.image = Some(ImageUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            continue;
        }
        let value = field
            .text()
            .await
            .map_err(|err| HttpError::BadRequest(format!("invalid field '{name}': {err}")))?;
        match name.as_str() {
            "name" => request.name = value,
            "description" => request.description = value,
            "owner_email" | "owner" => request.owner = value,
            "image_url" => request.image_url = Some(value),
            "qr_code_id" => request.qr_code_id = Some(value),
            "donor" => request.donor = Some(value),
            "date" => request.date = Some(value),
            "time" => request.time = Some(value),
            "flow" | "origin" => {
                let origin = ItemOrigin::parse(&value).ok_or_else(|| {
                    HttpError::BadRequest(format!("unknown flow '{}'", value.trim()))
                })?;
                request.origin = Some(origin);
            }
            _ => {}
        }
    }
    if request.owner.trim().is_empty() {
        return Err(HttpError::BadRequest("owner_email is required".to_string()));
    }
    Ok(request)
}
