use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use backend_domain::ports::Geocoder;
use backend_domain::Coordinates;

#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    pub url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Address lookup against a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: Client,
    url: String,
}

impl NominatimGeocoder {
    pub fn new(settings: GeocoderSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds.max(1)))
            .user_agent(settings.user_agent)
            .build()?;
        Ok(Self {
            client,
            url: settings.url,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let hits: Vec<SearchHit> = self
            .client
            .get(&self.url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .with_context(|| format!("geocoding '{}'", address))?
            .error_for_status()?
            .json()
            .await?;
        let Some(hit) = hits.into_iter().next() else {
            debug!("no geocoding match for '{}'", address);
            return Ok(None);
        };
        parse_hit(&hit).map(Some)
    }
}

fn parse_hit(hit: &SearchHit) -> Result<Coordinates> {
    let lat = hit.lat.trim().parse::<f64>().context("parsing latitude")?;
    let lng = hit.lon.trim().parse::<f64>().context("parsing longitude")?;
    Ok(Coordinates::new(lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_coordinates() {
        let hits: Vec<SearchHit> =
            serde_json::from_str(r#"[{"lat":"43.6534817","lon":"-79.3839347","display_name":"Toronto"}]"#)
                .expect("json");
        let coords = parse_hit(&hits[0]).expect("coords");
        assert!((coords.lat - 43.6534817).abs() < 1e-9);
        assert!((coords.lng + 79.3839347).abs() < 1e-9);
    }

    #[test]
    fn rejects_garbage_coordinates() {
        let hit = SearchHit {
            lat: "north".to_string(),
            lon: "0".to_string(),
        };
        assert!(parse_hit(&hit).is_err());
    }
}
