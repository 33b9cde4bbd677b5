use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::profile_queries;
use backend_application::AppState;
use backend_domain::ProfileResponse;

use crate::error::HttpError;
use crate::middleware::require_bearer;

pub async fn login_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, HttpError> {
    let token = require_bearer(&headers)?;
    Ok(Json(profile_queries::get_profile(&state, &token).await?))
}
