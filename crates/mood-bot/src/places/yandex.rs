//! Yandex Maps organization search (`search-maps.yandex.ru/v1`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{half_span_degrees, PlaceSearchProvider};
use crate::error::ProviderError;
use crate::http::fetch_json;
use crate::types::{Coordinate, PlaceResult};

pub struct YandexMapsProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    limit: usize,
}

impl YandexMapsProvider {
    pub fn new(client: Client, base_url: &str, api_key: String, limit: usize) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/", base_url.trim_end_matches('/')),
            api_key,
            limit,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Option<Vec<Feature>>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Properties,
}

/// GeoJSON point, `[lon, lat]`.
#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "CompanyMetaData", default)]
    company: Option<CompanyMetaData>,
}

#[derive(Debug, Deserialize)]
struct CompanyMetaData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl Feature {
    fn coordinate(&self) -> Option<Coordinate> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [lon, lat, ..] => Coordinate::new(*lat, *lon),
            _ => None,
        }
    }

    fn into_place(self) -> PlaceResult {
        let coordinate = self.coordinate();
        let Properties {
            name,
            description,
            company,
        } = self.properties;
        let (company_name, address, url) = match company {
            Some(c) => (c.name, c.address, c.url),
            None => (None, None, None),
        };
        PlaceResult::new(company_name.or(name), address.or(description))
            .with_coordinate(coordinate)
            .with_external_url(url)
    }
}

#[async_trait]
impl PlaceSearchProvider for YandexMapsProvider {
    fn name(&self) -> &'static str {
        "yandex_maps"
    }

    async fn search(
        &self,
        coordinate: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        let (dlat, dlon) = half_span_degrees(coordinate, radius_m);
        tracing::debug!(
            endpoint = %self.endpoint,
            keyword = %keyword,
            coordinate = %coordinate,
            radius_m,
            "Searching Yandex Maps"
        );

        let request = self.client.get(&self.endpoint).query(&[
            ("apikey", self.api_key.clone()),
            ("text", keyword.to_string()),
            ("lang", "ru_RU".to_string()),
            ("type", "biz".to_string()),
            ("ll", format!("{},{}", coordinate.longitude(), coordinate.latitude())),
            ("spn", format!("{:.6},{:.6}", dlon * 2.0, dlat * 2.0)),
            ("rspn", "1".to_string()),
            ("results", self.limit.to_string()),
        ]);

        let collection: FeatureCollection = fetch_json(request, &self.endpoint).await?;
        Ok(collection
            .features
            .unwrap_or_default()
            .into_iter()
            .take(self.limit)
            .map(Feature::into_place)
            .collect())
    }
}
