use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier the store assigns to a saved location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn generate() -> Self {
        LocationId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        LocationId(value.to_string())
    }
}

impl From<String> for LocationId {
    fn from(value: String) -> Self {
        LocationId(value)
    }
}

/// GeoNames identifier of a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(pub i64);

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A saved location. Never updated, only created and deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(rename = "gid")]
    pub external_id: ExternalId,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn from_details(id: LocationId, details: LocationDetails) -> Self {
        Self {
            id,
            external_id: details.external_id,
            name: details.name,
            country: details.country_code,
            lat: details.lat,
            lng: details.lng,
        }
    }
}

/// A place resolved by its external id, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDetails {
    pub external_id: ExternalId,
    pub name: String,
    pub country_code: String,
    pub lat: f64,
    pub lng: f64,
}

/// One hit of a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub external_id: ExternalId,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temp_c: f64,
    pub feels_like_c: Option<f64>,
    pub condition: Option<String>,
    pub humidity_pct: Option<u8>,
    pub wind_speed_kmh: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: Option<NaiveDate>,
    pub day_of_week: String,
    /// Missing for the current day once its maximum has passed.
    pub max_c: Option<f64>,
    pub min_c: Option<f64>,
    pub narrative: String,
    pub day_condition: Option<String>,
    pub precip_chance_pct: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastResult {
    pub days: Vec<DailyForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationWeather {
    pub location: Location,
    pub weather: WeatherObservation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationForecast {
    pub location: Location,
    pub forecast: ForecastResult,
}

/// Data for the search view: the echoed query (if a search ran) and its hits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub query: Option<String>,
    pub results: Vec<SearchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_document_uses_gid_field() {
        let location = Location {
            id: LocationId::from("abc"),
            external_id: ExternalId(2988507),
            name: "Paris".into(),
            country: "FR".into(),
            lat: 48.85341,
            lng: 2.3488,
        };

        let doc = serde_json::to_value(&location).expect("serialize");
        assert_eq!(doc["id"], "abc");
        assert_eq!(doc["gid"], 2988507);
        assert!(doc.get("external_id").is_none());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(LocationId::generate(), LocationId::generate());
    }
}
