use std::collections::HashMap;

use backend_domain::{
    rank_by_distance, round_to_hundredths, Account, Item, ItemStatus, NearbyItem, NearbyQuery,
};

use crate::commands::item_commands::require_item;
use crate::identity::resolve_any;
use crate::proximity::{clamp_limit, geocode_all, origin_from_query, resolve_origin, DEFAULT_ITEM_LIMIT};
use crate::{AppError, AppState};

pub async fn get_item(state: &AppState, qr_code_id: &str) -> Result<Item, AppError> {
    require_item(state, qr_code_id).await
}

pub async fn list_items(state: &AppState) -> Result<Vec<Item>, AppError> {
    Ok(state.item_repo.list_items().await?)
}

/// Available items ranked by the distance of the account holding them.
/// Each holder address is geocoded once.
pub async fn nearby_items(state: &AppState, query: NearbyQuery) -> Result<Vec<NearbyItem>, AppError> {
    let limit = clamp_limit(query.limit, DEFAULT_ITEM_LIMIT);
    let origin = origin_from_query(&query)?;
    let Some(origin) = resolve_origin(state, origin).await? else {
        return Ok(Vec::new());
    };

    let items = state
        .item_repo
        .list_items()
        .await?
        .into_iter()
        .filter(|item| item.status == ItemStatus::Available)
        .collect::<Vec<_>>();

    let mut holders: HashMap<String, Option<Account>> = HashMap::new();
    for item in &items {
        if holders.contains_key(&item.owner) {
            continue;
        }
        let holder = resolve_any(state.account_repo.as_ref(), &item.owner)
            .await?
            .filter(|account| account.kind.has_address() && account.address.is_some());
        holders.insert(item.owner.clone(), holder);
    }

    let located = holders
        .iter()
        .filter_map(|(owner, holder)| {
            holder
                .as_ref()
                .and_then(|account| account.address.clone())
                .map(|address| (owner.clone(), address))
        })
        .collect::<Vec<_>>();
    let addresses = located
        .iter()
        .map(|(_, address)| address.clone())
        .collect::<Vec<_>>();
    let coordinates = geocode_all(state.geocoder.as_ref(), &addresses).await;
    let owner_coords = located
        .into_iter()
        .zip(coordinates)
        .map(|((owner, _), coords)| (owner, coords))
        .collect::<HashMap<_, _>>();

    let candidates = items
        .into_iter()
        .map(|item| {
            let coords = owner_coords.get(&item.owner).copied().flatten();
            (item, coords)
        })
        .collect::<Vec<_>>();

    let ranked = rank_by_distance(origin, candidates, limit)
        .into_iter()
        .filter_map(|ranked| {
            let holder = holders.get(&ranked.candidate.owner)?.as_ref()?;
            Some(NearbyItem {
                holder_name: holder.name.clone(),
                holder_address: holder.address.clone().unwrap_or_default(),
                distance_km: round_to_hundredths(ranked.distance_km),
                item: ranked.candidate,
            })
        })
        .collect();
    Ok(ranked)
}
