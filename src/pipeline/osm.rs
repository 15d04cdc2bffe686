//! OpenStreetMap adapters: Nominatim geocoding and Overpass footprints.

use crate::config::PipelineConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::models::LatLon;
use crate::pipeline::fetch::{endpoint_url, get_json, http_client};
use crate::pipeline::traits::{FootprintFeature, FootprintProvider, GeocodeHit, Geocoder};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(config: &PipelineConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.endpoints.geocoder.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str, locale: &str) -> ProviderResult<Option<GeocodeHit>> {
        let url = endpoint_url(
            &format!("{}/search", self.endpoint),
            &[
                ("q", address),
                ("format", "jsonv2"),
                ("limit", "1"),
                ("accept-language", locale),
            ],
        )?;
        let source_url = endpoint_url(&format!("{}/search", self.endpoint), &[("q", address)])?;
        let places: Option<Vec<NominatimPlace>> = get_json(&self.client, url).await?;
        let Some(place) = places.and_then(|p| p.into_iter().next()) else {
            return Ok(None);
        };
        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| ProviderError::Malformed(format!("lat: {e}")))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|e| ProviderError::Malformed(format!("lon: {e}")))?;
        Ok(Some(GeocodeHit {
            lat,
            lon,
            display_name: place.display_name,
            source_url: source_url.to_string(),
        }))
    }
}

pub struct OverpassFootprints {
    client: Client,
    endpoint: String,
}

impl OverpassFootprints {
    pub fn new(config: &PipelineConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(config)?,
            endpoint: config.endpoints.footprint.clone(),
        })
    }

    fn query(lat: f64, lon: f64, radius_m: f64) -> String {
        format!(
            "[out:json][timeout:25];nwr(around:{radius_m:.0},{lat},{lon})[building];out tags center;"
        )
    }
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn position(&self) -> Option<(f64, f64)> {
        match (&self.center, self.lat, self.lon) {
            (Some(c), _, _) => Some((c.lat, c.lon)),
            (None, Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[async_trait]
impl FootprintProvider for OverpassFootprints {
    async fn nearest_building(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> ProviderResult<Option<FootprintFeature>> {
        let query = Self::query(lat, lon, radius_m);
        debug!(%query, "overpass");
        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }
        let body: OverpassResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let here = LatLon::new(lat, lon);
        let nearest = body
            .elements
            .into_iter()
            .filter(|e| !e.tags.is_empty())
            .filter_map(|e| {
                let (elat, elon) = e.position()?;
                Some((here.distance_m(&LatLon::new(elat, elon)), elat, elon, e))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0));

        Ok(nearest.map(|(_, elat, elon, e)| FootprintFeature {
            osm_type: e.kind,
            osm_id: e.id,
            lat: elat,
            lon: elon,
            tags: e.tags,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overpass_query_targets_buildings() {
        let q = OverpassFootprints::query(48.2, 16.38, 40.0);
        assert!(q.contains("around:40,48.2,16.38"));
        assert!(q.contains("[building]"));
    }

    #[test]
    fn element_position_prefers_center() {
        let raw = r#"{"elements":[{"type":"way","id":7,"center":{"lat":1.0,"lon":2.0},"tags":{"building":"yes"}}]}"#;
        let parsed: OverpassResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.elements[0].position(), Some((1.0, 2.0)));
    }
}
