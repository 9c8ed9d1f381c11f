//! The operations behind each page: list, search, add, delete, forecast.
//!
//! Every operation is a single stateless transaction over the store and the
//! upstream clients; errors end the operation and are returned as-is.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    geocode::Geocoder,
    markup,
    model::{ExternalId, Location, LocationForecast, LocationId, LocationWeather, SearchPage},
    provider::WeatherProvider,
    store::LocationStore,
};

#[derive(Debug, Clone)]
pub struct Workflows {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
    store: Arc<dyn LocationStore>,
}

impl Workflows {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        weather: Arc<dyn WeatherProvider>,
        store: Arc<dyn LocationStore>,
    ) -> Self {
        Self {
            geocoder,
            weather,
            store,
        }
    }

    /// Every saved location with its current conditions.
    ///
    /// Conditions are fetched one location at a time; the first failure
    /// aborts the whole listing.
    pub async fn list_with_weather(&self) -> AppResult<Vec<LocationWeather>> {
        let locations = self.store.list().await?;
        let mut out = Vec::with_capacity(locations.len());

        for location in locations {
            let weather = self
                .weather
                .current_conditions(location.lat, location.lng)
                .await?;
            out.push(LocationWeather { location, weather });
        }

        Ok(out)
    }

    pub fn search_form(&self) -> SearchPage {
        SearchPage::default()
    }

    /// Search places by name, echoing the cleaned query back.
    pub async fn search_execute(&self, raw_query: &str) -> AppResult<SearchPage> {
        let query = markup::clean(raw_query);

        if query.is_empty() {
            return Ok(SearchPage {
                query: Some(query),
                results: Vec::new(),
            });
        }

        let results = self.geocoder.search_by_name(&query).await?;
        tracing::debug!(%query, hits = results.len(), "search finished");

        Ok(SearchPage {
            query: Some(query),
            results,
        })
    }

    /// Resolve an external id and save it.
    pub async fn add_location(&self, raw_external_id: &str) -> AppResult<Location> {
        let external_id = parse_external_id(raw_external_id)?;
        let details = self.geocoder.get_by_external_id(external_id).await?;
        self.store.add(details).await
    }

    pub async fn delete_location(&self, id: &LocationId) -> AppResult<()> {
        self.store.delete(id).await
    }

    pub async fn forecast(&self, id: &LocationId) -> AppResult<LocationForecast> {
        let location = self.store.get(id).await?;
        let forecast = self
            .weather
            .daily_forecast(location.lat, location.lng)
            .await?;

        Ok(LocationForecast { location, forecast })
    }
}

fn parse_external_id(raw: &str) -> AppResult<ExternalId> {
    let cleaned = markup::clean(raw);
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidExternalId(cleaned));
    }
    cleaned
        .parse()
        .map(ExternalId)
        .map_err(|_| AppError::InvalidExternalId(cleaned))
}
