//! Keyword search inside a bounding box via OpenStreetMap Nominatim.

use async_trait::async_trait;
use reqwest::Client;

use super::{half_span_degrees, PlaceSearchProvider};
use crate::error::ProviderError;
use crate::http::fetch_json;
use crate::location::nominatim::NominatimRecord;
use crate::types::{Coordinate, PlaceResult};

pub struct NominatimPlacesProvider {
    client: Client,
    endpoint: String,
    limit: usize,
}

impl NominatimPlacesProvider {
    pub fn new(client: Client, base_url: &str, limit: usize) -> Self {
        Self {
            client,
            endpoint: format!("{}/search", base_url.trim_end_matches('/')),
            limit,
        }
    }
}

/// `left,top,right,bottom` around `center`, clamped to valid ranges.
fn viewbox(center: Coordinate, radius_m: u32) -> String {
    let (dlat, dlon) = half_span_degrees(center, radius_m);
    let left = (center.longitude() - dlon).max(-180.0);
    let right = (center.longitude() + dlon).min(180.0);
    let top = (center.latitude() + dlat).min(90.0);
    let bottom = (center.latitude() - dlat).max(-90.0);
    format!("{:.6},{:.6},{:.6},{:.6}", left, top, right, bottom)
}

fn into_place(record: NominatimRecord) -> PlaceResult {
    let coordinate = record.coordinate();
    let url = record.osm_url();
    // jsonv2 leaves `name` empty for unnamed objects; the first segment of
    // the display name is the closest thing to one.
    let name = record.name.filter(|n| !n.trim().is_empty()).or_else(|| {
        record
            .display_name
            .as_deref()
            .and_then(|d| d.split(',').next())
            .map(str::to_string)
    });
    PlaceResult::new(name, record.display_name)
        .with_coordinate(coordinate)
        .with_external_url(url)
}

#[async_trait]
impl PlaceSearchProvider for NominatimPlacesProvider {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn search(
        &self,
        coordinate: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        let viewbox = viewbox(coordinate, radius_m);
        tracing::debug!(
            endpoint = %self.endpoint,
            keyword = %keyword,
            viewbox = %viewbox,
            "Searching Nominatim"
        );

        let request = self.client.get(&self.endpoint).query(&[
            ("q", keyword.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", self.limit.to_string()),
            ("viewbox", viewbox),
            ("bounded", "1".to_string()),
        ]);

        let records: Vec<NominatimRecord> = fetch_json(request, &self.endpoint).await?;
        Ok(records
            .into_iter()
            .take(self.limit)
            .map(into_place)
            .collect())
    }
}
