use axum::http::HeaderMap;

use backend_domain::RuntimeConfig;

use crate::error::HttpError;

/// Admin check against the configured token. With no token configured
/// every caller is admitted.
pub fn authorize_admin(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(admin_token) = &config.admin_token {
        return extract_bearer(headers)
            .map(|v| v == *admin_token)
            .unwrap_or(false);
    }
    true
}

pub fn require_admin(config: &RuntimeConfig, headers: &HeaderMap) -> Result<(), HttpError> {
    if authorize_admin(config, headers) {
        Ok(())
    } else {
        Err(HttpError::Unauthorized("admin token required".to_string()))
    }
}

pub fn require_bearer(headers: &HeaderMap) -> Result<String, HttpError> {
    extract_bearer(headers)
        .ok_or_else(|| HttpError::Unauthorized("Missing bearer token".to_string()))
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
