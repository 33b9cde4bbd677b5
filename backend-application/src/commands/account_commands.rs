use chrono::Utc;
use tracing::{info, warn};

use backend_domain::{
    normalize_optional_text, Account, AccountIdentity, AccountKind, RegisterAccountRequest,
    RegisterAccountResponse,
};

use crate::identity::{display_kind, require_account, resolve_account};
use crate::{AppError, AppState};

/// Creates the sign-in user at the identity provider, then the profile
/// keyed by the returned UID.
pub async fn register_account(
    state: &AppState,
    kind: AccountKind,
    request: RegisterAccountRequest,
) -> Result<RegisterAccountResponse, AppError> {
    let name = request.name.trim().to_string();
    let email = request.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "name, email and password are required".to_string(),
        ));
    }
    let address = normalize_optional_text(request.address);
    if kind.has_address() && address.is_none() {
        return Err(AppError::BadRequest("address is required".to_string()));
    }

    if resolve_account(state.account_repo.as_ref(), kind, &email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "{} already registered",
            display_kind(kind)
        )));
    }

    let uid = state
        .identity_provider
        .create_user(&email, &request.password, &name)
        .await
        .map_err(AppError::Upstream)?;

    let account = Account {
        kind,
        identity: AccountIdentity::new(uid.clone(), Some(uid), Some(email)),
        name,
        points: kind.starting_points(),
        address: if kind.has_address() { address } else { None },
        created_at: Utc::now(),
    };
    if !state.account_repo.insert_account(&account).await? {
        return Err(AppError::Conflict(format!(
            "{} already registered",
            display_kind(kind)
        )));
    }
    state.metrics.record_registration();
    info!("{} '{}' registered", kind.as_str(), account.key());

    Ok(RegisterAccountResponse {
        message: format!("{} registered successfully", display_kind(kind)),
        account,
    })
}

pub async fn delete_account(
    state: &AppState,
    kind: AccountKind,
    identifier: &str,
) -> Result<(), AppError> {
    let account = require_account(state, kind, identifier).await?;
    if !state.account_repo.delete_account(kind, account.key()).await? {
        return Err(AppError::NotFound(format!("{} not found", display_kind(kind))));
    }
    warn!("{} '{}' deleted", kind.as_str(), account.key());
    Ok(())
}
