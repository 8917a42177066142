//! Places search behind a single provider-agnostic trait.
//!
//! Exactly one backend is active per deployment; [`build_places_provider`]
//! picks it from configuration.

pub mod foursquare;
pub mod nominatim;
pub mod yandex;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

use crate::config::{BotConfig, PlacesBackend};
use crate::error::{ConfigError, ProviderError};
use crate::types::{Coordinate, PlaceResult};

pub use foursquare::FoursquareProvider;
pub use nominatim::NominatimPlacesProvider;
pub use yandex::YandexMapsProvider;

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// A places-search backend.
///
/// Implementations send one request, keep the provider's ordering and turn
/// missing name/address fields into placeholders instead of failing. An
/// empty list is a normal outcome.
#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(
        &self,
        coordinate: Coordinate,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceResult>, ProviderError>;
}

/// Result of a search as seen by the reply logic.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(Vec<PlaceResult>),
    Empty,
    Failed(ProviderError),
}

impl From<Result<Vec<PlaceResult>, ProviderError>> for SearchOutcome {
    fn from(result: Result<Vec<PlaceResult>, ProviderError>) -> Self {
        match result {
            Ok(places) if places.is_empty() => SearchOutcome::Empty,
            Ok(places) => SearchOutcome::Found(places),
            Err(e) => SearchOutcome::Failed(e),
        }
    }
}

/// The active provider plus the search radius it is queried with.
pub struct PlaceSearch {
    provider: Arc<dyn PlaceSearchProvider>,
    radius_m: u32,
}

impl PlaceSearch {
    pub fn new(provider: Arc<dyn PlaceSearchProvider>, radius_m: u32) -> Self {
        Self { provider, radius_m }
    }

    pub async fn search(&self, coordinate: Coordinate, keyword: &str) -> SearchOutcome {
        let outcome: SearchOutcome = self
            .provider
            .search(coordinate, keyword, self.radius_m)
            .await
            .into();

        match &outcome {
            SearchOutcome::Found(places) => tracing::info!(
                provider = self.provider.name(),
                keyword = %keyword,
                count = places.len(),
                "Places found"
            ),
            SearchOutcome::Empty => tracing::info!(
                provider = self.provider.name(),
                keyword = %keyword,
                coordinate = %coordinate,
                "No places nearby"
            ),
            SearchOutcome::Failed(e) => tracing::error!(
                provider = self.provider.name(),
                keyword = %keyword,
                error = %e,
                "Places search failed"
            ),
        }
        outcome
    }
}

/// Build the backend selected in `config.places`.
pub fn build_places_provider(
    config: &BotConfig,
    client: Client,
) -> Result<Arc<dyn PlaceSearchProvider>, ConfigError> {
    let places = &config.places;
    let provider: Arc<dyn PlaceSearchProvider> = match places.backend {
        PlacesBackend::Foursquare => {
            let key = places
                .foursquare_api_key
                .clone()
                .ok_or(ConfigError::Missing("FOURSQUARE_API_KEY"))?;
            Arc::new(FoursquareProvider::new(
                client,
                &places.foursquare_base_url,
                key,
                places.limit,
            ))
        }
        PlacesBackend::YandexMaps => {
            let key = places
                .yandex_api_key
                .clone()
                .ok_or(ConfigError::Missing("YANDEX_API_KEY"))?;
            Arc::new(YandexMapsProvider::new(
                client,
                &places.yandex_base_url,
                key,
                places.limit,
            ))
        }
        PlacesBackend::Nominatim => Arc::new(NominatimPlacesProvider::new(
            client,
            &places.nominatim_base_url,
            places.limit,
        )),
    };
    tracing::info!(
        provider = provider.name(),
        radius_m = places.radius_m,
        limit = places.limit,
        "Places backend selected"
    );
    Ok(provider)
}

/// Half-extent in degrees (lat, lon) of a square of `radius_m` around `center`.
pub(crate) fn half_span_degrees(center: Coordinate, radius_m: u32) -> (f64, f64) {
    let dlat = f64::from(radius_m) / METERS_PER_DEGREE_LAT;
    let cos_lat = center.latitude().to_radians().cos().abs().max(0.01);
    let dlon = (dlat / cos_lat).min(180.0);
    (dlat.min(90.0), dlon)
}
