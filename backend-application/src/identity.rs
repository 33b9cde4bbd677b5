//! Maps the identifiers callers send (document keys, provider UIDs, emails,
//! URL-encoded variants of those) onto stored accounts. No other module
//! performs fallback lookups.

use backend_domain::ports::{AccountField, AccountRepository};
use backend_domain::{Account, AccountKind, VerifiedClaims};

use crate::{AppError, AppState};

/// Finds an account of `kind` by key, then `uid`, then `email`, then retries
/// with the URL-decoded identifier.
pub async fn resolve_account(
    repo: &dyn AccountRepository,
    kind: AccountKind,
    raw: &str,
) -> anyhow::Result<Option<Account>> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return Ok(None);
    }
    if let Some(account) = lookup(repo, kind, candidate).await? {
        return Ok(Some(account));
    }
    let decoded = match urlencoding::decode(candidate) {
        Ok(value) => value.trim().to_string(),
        Err(_) => return Ok(None),
    };
    if decoded.is_empty() || decoded == candidate {
        return Ok(None);
    }
    lookup(repo, kind, &decoded).await
}

/// Tries every collection, businesses first.
pub async fn resolve_any(repo: &dyn AccountRepository, raw: &str) -> anyhow::Result<Option<Account>> {
    for kind in AccountKind::RESOLUTION_ORDER {
        if let Some(account) = resolve_account(repo, kind, raw).await? {
            return Ok(Some(account));
        }
    }
    Ok(None)
}

/// Picks the caller's account from verified token claims.
///
/// Business wins over retailer, retailer over tourist, when one person holds
/// several profiles.
pub async fn resolve_profile(
    repo: &dyn AccountRepository,
    claims: &VerifiedClaims,
) -> anyhow::Result<Option<Account>> {
    if let Some(account) = repo.get_account(AccountKind::Business, &claims.uid).await? {
        return Ok(Some(account));
    }
    if let Some(email) = claims.email.as_deref() {
        if let Some(account) = repo.get_account(AccountKind::Business, email).await? {
            return Ok(Some(account));
        }
        if let Some(account) = repo
            .find_account_by(AccountKind::Retailer, AccountField::Email, &email.to_lowercase())
            .await?
        {
            return Ok(Some(account));
        }
    }
    if let Some(account) = repo.get_account(AccountKind::Tourist, &claims.uid).await? {
        return Ok(Some(account));
    }
    if let Some(account) = resolve_any(repo, &claims.uid).await? {
        return Ok(Some(account));
    }
    match claims.email.as_deref() {
        Some(email) => resolve_any(repo, email).await,
        None => Ok(None),
    }
}

/// Like [`resolve_account`] but turns a miss into a 404.
pub async fn require_account(
    state: &AppState,
    kind: AccountKind,
    raw: &str,
) -> Result<Account, AppError> {
    resolve_account(state.account_repo.as_ref(), kind, raw)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", display_kind(kind))))
}

pub fn display_kind(kind: AccountKind) -> &'static str {
    match kind {
        AccountKind::Tourist => "Tourist",
        AccountKind::Business => "Business",
        AccountKind::Retailer => "Retailer",
    }
}

async fn lookup(
    repo: &dyn AccountRepository,
    kind: AccountKind,
    value: &str,
) -> anyhow::Result<Option<Account>> {
    if let Some(account) = repo.get_account(kind, value).await? {
        return Ok(Some(account));
    }
    if let Some(account) = repo.find_account_by(kind, AccountField::Uid, value).await? {
        return Ok(Some(account));
    }
    repo.find_account_by(kind, AccountField::Email, &value.to_lowercase())
        .await
}
