use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a chat participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Leisure intent classified from a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Restaurant,
    Cinema,
    Theatre,
    Museum,
    Bored,
    Unknown,
}

impl Intent {
    /// Categories a user can pick and later search for.
    pub const SELECTABLE: [Intent; 4] = [
        Intent::Restaurant,
        Intent::Cinema,
        Intent::Theatre,
        Intent::Museum,
    ];

    /// Whether this intent is a searchable category (and may be stored).
    pub fn is_selectable(self) -> bool {
        Self::SELECTABLE.contains(&self)
    }

    /// Keyword sent to places providers. `None` for bored/unknown.
    pub fn search_keyword(self) -> Option<&'static str> {
        match self {
            Intent::Restaurant => Some("restaurant"),
            Intent::Cinema => Some("cinema"),
            Intent::Theatre => Some("theatre"),
            Intent::Museum => Some("museum"),
            Intent::Bored | Intent::Unknown => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intent::Restaurant => "restaurant",
            Intent::Cinema => "cinema",
            Intent::Theatre => "theatre",
            Intent::Museum => "museum",
            Intent::Bored => "bored",
            Intent::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Returns `None` for non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    /// Parses the string pairs some providers return (`"55.75"`, `"37.61"`).
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let lat = latitude.trim().parse::<f64>().ok()?;
        let lon = longitude.trim().parse::<f64>().ok()?;
        Self::new(lat, lon)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Where the user wants to search.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Shared geolocation.
    Direct(Coordinate),
    /// Free-text address that needs geocoding.
    Address(String),
}

/// A location resolved to a point, with a label when one was geocoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    pub label: Option<String>,
}

/// Rating as reported by the provider, numeric or free-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Text(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{}", score),
            Rating::Text(text) => f.write_str(text),
        }
    }
}

/// Provider-agnostic place record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceResult {
    pub name: String,
    pub address: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub rating: Option<Rating>,
    pub external_url: Option<String>,
}

impl PlaceResult {
    pub const UNKNOWN_NAME: &'static str = "Unknown";

    /// Builds a record, substituting the placeholder for a blank name and
    /// dropping blank optional strings.
    pub fn new(name: Option<String>, address: Option<String>) -> Self {
        let name = non_blank(name).unwrap_or_else(|| Self::UNKNOWN_NAME.to_string());
        Self {
            name,
            address: non_blank(address),
            coordinate: None,
            rating: None,
            external_url: None,
        }
    }

    pub fn with_coordinate(mut self, coordinate: Option<Coordinate>) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn with_rating(mut self, rating: Option<Rating>) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_external_url(mut self, url: Option<String>) -> Self {
        self.external_url = non_blank(url);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(55.75, 37.61).is_some());
        assert!(Coordinate::new(90.0, -180.0).is_some());
        assert!(Coordinate::new(90.1, 0.0).is_none());
        assert!(Coordinate::new(0.0, 180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_coordinate_parse_strings() {
        let c = Coordinate::parse(" 55.7558 ", "37.6173").unwrap();
        assert_eq!(c.latitude(), 55.7558);
        assert_eq!(c.longitude(), 37.6173);
        assert!(Coordinate::parse("north", "37.6").is_none());
    }

    #[test]
    fn test_selectable_intents() {
        assert!(Intent::Museum.is_selectable());
        assert!(!Intent::Bored.is_selectable());
        assert!(!Intent::Unknown.is_selectable());
        assert_eq!(Intent::Theatre.search_keyword(), Some("theatre"));
        assert_eq!(Intent::Unknown.search_keyword(), None);
    }

    #[test]
    fn test_place_defaults() {
        let place = PlaceResult::new(None, Some("   ".to_string()));
        assert_eq!(place.name, PlaceResult::UNKNOWN_NAME);
        assert!(place.address.is_none());

        let named = PlaceResult::new(Some(" Пушкин ".to_string()), None);
        assert_eq!(named.name, "Пушкин");
    }

    #[test]
    fn test_rating_untagged() {
        let score: Rating = serde_json::from_str("8.7").unwrap();
        assert_eq!(score, Rating::Score(8.7));
        let text: Rating = serde_json::from_str("\"4+\"").unwrap();
        assert_eq!(text.to_string(), "4+");
    }
}
