//! Turns a geolocation or a free-text address into a point to search around.

pub mod nominatim;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::types::{Coordinate, LocationQuery, ResolvedLocation};

pub use nominatim::NominatimGeocoder;

/// One geocoding match.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub label: String,
}

/// Free-text address lookup. Candidates come back in provider order.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str, limit: usize)
        -> Result<Vec<GeocodeCandidate>, ProviderError>;
}

/// Outcome of resolving a [`LocationQuery`].
#[derive(Debug)]
pub enum Resolution {
    Resolved(ResolvedLocation),
    /// The geocoder answered but had no candidate for the address.
    NotFound,
    Failed(ProviderError),
}

pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve a query. Direct coordinates never touch the geocoder; an
    /// address asks for a single candidate and uses it as-is.
    pub async fn resolve(&self, query: &LocationQuery) -> Resolution {
        let address = match query {
            LocationQuery::Direct(coordinate) => {
                return Resolution::Resolved(ResolvedLocation {
                    coordinate: *coordinate,
                    label: None,
                })
            }
            LocationQuery::Address(address) => address.trim(),
        };

        if address.is_empty() {
            return Resolution::NotFound;
        }

        match self.geocoder.geocode(address, 1).await {
            Ok(candidates) => match candidates.into_iter().next() {
                Some(candidate) => {
                    tracing::info!(
                        address = %address,
                        coordinate = %candidate.coordinate,
                        "Address resolved"
                    );
                    Resolution::Resolved(ResolvedLocation {
                        coordinate: candidate.coordinate,
                        label: Some(candidate.label),
                    })
                }
                None => {
                    tracing::info!(address = %address, "Address not found");
                    Resolution::NotFound
                }
            },
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Geocoding failed");
                Resolution::Failed(e)
            }
        }
    }
}
