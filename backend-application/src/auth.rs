use tracing::warn;

use backend_domain::VerifiedClaims;

use crate::{AppError, AppState};

pub async fn verify_token(state: &AppState, token: &str) -> Result<VerifiedClaims, AppError> {
    state
        .identity_provider
        .verify_token(token)
        .await
        .map_err(|err| {
            warn!("id token rejected: {}", err);
            AppError::Unauthorized("Invalid or expired ID token".to_string())
        })
}
