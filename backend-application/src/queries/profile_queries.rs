use backend_domain::ProfileResponse;

use crate::auth::verify_token;
use crate::identity::resolve_profile;
use crate::{AppError, AppState};

pub async fn get_profile(state: &AppState, token: &str) -> Result<ProfileResponse, AppError> {
    let claims = verify_token(state, token).await?;
    let profile = resolve_profile(state.account_repo.as_ref(), &claims)
        .await?
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;
    Ok(ProfileResponse {
        role: profile.kind,
        profile,
    })
}
