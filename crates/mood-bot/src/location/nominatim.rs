//! OpenStreetMap Nominatim geocoder.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{GeocodeCandidate, Geocoder};
use crate::error::ProviderError;
use crate::http::fetch_json;
use crate::types::Coordinate;

/// Raw `/search` record. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimRecord {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub osm_type: Option<String>,
    #[serde(default)]
    pub osm_id: Option<u64>,
}

impl NominatimRecord {
    pub(crate) fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::parse(&self.lat, &self.lon)
    }

    pub(crate) fn osm_url(&self) -> Option<String> {
        match (&self.osm_type, self.osm_id) {
            (Some(kind), Some(id)) => Some(format!("https://www.openstreetmap.org/{}/{}", kind, id)),
            _ => None,
        }
    }
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<GeocodeCandidate>, ProviderError> {
        let endpoint = format!("{}/search", self.base_url);
        tracing::debug!(endpoint = %endpoint, query = %query, "Geocoding address");

        let limit = limit.to_string();
        let request = self.client.get(&endpoint).query(&[
            ("q", query),
            ("format", "json"),
            ("limit", limit.as_str()),
        ]);
        let records: Vec<NominatimRecord> = fetch_json(request, &endpoint).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let coordinate = record.coordinate()?;
                let label = record
                    .display_name
                    .or(record.name)
                    .unwrap_or_else(|| coordinate.to_string());
                Some(GeocodeCandidate { coordinate, label })
            })
            .collect())
    }
}
