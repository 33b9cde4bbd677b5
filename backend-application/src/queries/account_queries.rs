use backend_domain::{
    rank_by_distance, round_to_hundredths, Account, AccountKind, NearbyAccount, NearbyQuery,
};

use crate::identity::require_account;
use crate::proximity::{
    clamp_limit, geocode_all, origin_from_query, resolve_origin, DEFAULT_ACCOUNT_LIMIT,
};
use crate::{AppError, AppState};

pub async fn get_account(
    state: &AppState,
    kind: AccountKind,
    identifier: &str,
) -> Result<Account, AppError> {
    require_account(state, kind, identifier).await
}

pub async fn list_accounts(state: &AppState, kind: AccountKind) -> Result<Vec<Account>, AppError> {
    Ok(state.account_repo.list_accounts(kind).await?)
}

/// Businesses or retailers ordered by distance from the query origin.
pub async fn nearby_accounts(
    state: &AppState,
    kind: AccountKind,
    query: NearbyQuery,
) -> Result<Vec<NearbyAccount>, AppError> {
    if !kind.has_address() {
        return Err(AppError::BadRequest(format!(
            "{} accounts have no address",
            kind.as_str()
        )));
    }
    let limit = clamp_limit(query.limit, DEFAULT_ACCOUNT_LIMIT);
    let origin = origin_from_query(&query)?;
    let Some(origin) = resolve_origin(state, origin).await? else {
        return Ok(Vec::new());
    };

    let accounts = state
        .account_repo
        .list_accounts(kind)
        .await?
        .into_iter()
        .filter_map(|account| {
            let address = account.address.clone()?;
            Some((account, address))
        })
        .collect::<Vec<_>>();
    let addresses = accounts
        .iter()
        .map(|(_, address)| address.clone())
        .collect::<Vec<_>>();
    let coordinates = geocode_all(state.geocoder.as_ref(), &addresses).await;
    let candidates = accounts.into_iter().zip(coordinates).collect::<Vec<_>>();

    Ok(rank_by_distance(origin, candidates, limit)
        .into_iter()
        .map(|ranked| {
            let (account, address) = ranked.candidate;
            NearbyAccount {
                id: account.identity.key,
                name: account.name,
                address,
                points: account.points,
                distance_km: round_to_hundredths(ranked.distance_km),
            }
        })
        .collect())
}
