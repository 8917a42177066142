//! Foursquare Places API v3 binding (radius + relevance sort).

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;

use super::PlaceSearchProvider;
use crate::error::ProviderError;
use crate::http::fetch_json;
use crate::types::{Coordinate, PlaceResult, Rating};

pub struct FoursquareProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    limit: usize,
}

impl FoursquareProvider {
    pub fn new(client: Client, base_url: &str, api_key: String, limit: usize) -> Self {
        Self {
            client,
            endpoint: format!("{}/v3/places/search", base_url.trim_end_matches('/')),
            api_key,
            limit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Absent and `null` both mean nothing nearby.
    #[serde(default)]
    results: Option<Vec<FsqPlace>>,
}

#[derive(Debug, Deserialize)]
struct FsqPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: FsqLocation,
    #[serde(default)]
    geocodes: Option<FsqGeocodes>,
    #[serde(default)]
    rating: Option<Rating>,
}

#[derive(Debug, Default, Deserialize)]
struct FsqLocation {
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FsqGeocodes {
    #[serde(default)]
    main: Option<FsqPoint>,
}

#[derive(Debug, Deserialize)]
struct FsqPoint {
    latitude: f64,
    longitude: f64,
}

impl FsqPlace {
    fn coordinate(&self) -> Option<Coordinate> {
        let main = self.geocodes.as_ref().and_then(|g| g.main.as_ref());
        match main {
            Some(point) => Coordinate::new(point.latitude, point.longitude),
            None => Coordinate::new(self.location.lat?, self.location.lng?),
        }
    }

    fn into_place(self) -> PlaceResult {
        let coordinate = self.coordinate();
        let address = self
            .location
            .formatted_address
            .or(self.location.address);
        PlaceResult::new(self.name, address)
            .with_coordinate(coordinate)
            .with_rating(self.rating)
    }
}

#[async_trait]
impl PlaceSearchProvider for FoursquareProvider {
    fn name(&self) -> &'static str {
        "foursquare"
    }

    async fn search(
        &self,
        coordinate: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            keyword = %keyword,
            coordinate = %coordinate,
            radius_m,
            "Searching Foursquare"
        );

        let request = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .header(ACCEPT, "application/json")
            .query(&[
                ("ll", coordinate.to_string()),
                ("query", keyword.to_string()),
                ("limit", self.limit.to_string()),
                ("sort", "RELEVANCE".to_string()),
                ("radius", radius_m.to_string()),
            ]);

        let response: SearchResponse = fetch_json(request, &self.endpoint).await?;
        Ok(response
            .results
            .unwrap_or_default()
            .into_iter()
            .take(self.limit)
            .map(FsqPlace::into_place)
            .collect())
    }
}
