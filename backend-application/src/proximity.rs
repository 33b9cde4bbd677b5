use futures_util::future::join_all;
use tracing::warn;

use backend_domain::ports::Geocoder;
use backend_domain::{Coordinates, NearbyQuery, Origin};

use crate::{AppError, AppState};

pub const MAX_NEARBY_LIMIT: usize = 100;
pub const DEFAULT_ACCOUNT_LIMIT: usize = 20;
pub const DEFAULT_ITEM_LIMIT: usize = 50;

pub fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, MAX_NEARBY_LIMIT)
}

/// Coordinates win over an address when both are supplied.
pub fn origin_from_query(query: &NearbyQuery) -> Result<Origin, AppError> {
    match (query.lat, query.lng) {
        (Some(lat), Some(lng)) => {
            let coords = Coordinates::new(lat, lng);
            if !coords.is_valid() {
                return Err(AppError::BadRequest("lat/lng out of range".to_string()));
            }
            return Ok(Origin::Coordinates(coords));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(AppError::BadRequest(
                "lat and lng must be supplied together".to_string(),
            ));
        }
        (None, None) => {}
    }
    match query.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => Ok(Origin::Address(address.to_string())),
        _ => Err(AppError::BadRequest(
            "provide an address or lat and lng".to_string(),
        )),
    }
}

/// `Ok(None)` when the origin address has no geocoding match.
pub async fn resolve_origin(
    state: &AppState,
    origin: Origin,
) -> Result<Option<Coordinates>, AppError> {
    match origin {
        Origin::Coordinates(coords) => Ok(Some(coords)),
        Origin::Address(address) => state
            .geocoder
            .geocode(&address)
            .await
            .map_err(AppError::Upstream),
    }
}

/// Geocodes every address concurrently. Failures count as misses.
pub async fn geocode_all(geocoder: &dyn Geocoder, addresses: &[String]) -> Vec<Option<Coordinates>> {
    let lookups = addresses.iter().map(|address| async move {
        match geocoder.geocode(address).await {
            Ok(coords) => coords,
            Err(err) => {
                warn!("geocoding '{}' failed: {}", address, err);
                None
            }
        }
    });
    join_all(lookups).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None, DEFAULT_ACCOUNT_LIMIT), 20);
        assert_eq!(clamp_limit(Some(0), DEFAULT_ACCOUNT_LIMIT), 1);
        assert_eq!(clamp_limit(Some(500), DEFAULT_ITEM_LIMIT), MAX_NEARBY_LIMIT);
    }

    #[test]
    fn origin_prefers_coordinates() {
        let query = NearbyQuery {
            address: Some("Toronto".to_string()),
            lat: Some(43.0),
            lng: Some(-79.0),
            limit: None,
        };
        assert!(matches!(origin_from_query(&query), Ok(Origin::Coordinates(_))));
    }

    #[test]
    fn origin_requires_something() {
        let query = NearbyQuery::default();
        assert!(matches!(origin_from_query(&query), Err(AppError::BadRequest(_))));
        let half = NearbyQuery {
            lat: Some(1.0),
            ..NearbyQuery::default()
        };
        assert!(matches!(origin_from_query(&half), Err(AppError::BadRequest(_))));
    }
}
