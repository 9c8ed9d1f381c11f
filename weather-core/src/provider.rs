use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::AppResult,
    model::{ForecastResult, WeatherObservation},
};

pub mod weather_company;

pub use weather_company::WeatherCompanyProvider;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(&self, lat: f64, lng: f64) -> AppResult<WeatherObservation>;

    async fn daily_forecast(&self, lat: f64, lng: f64) -> AppResult<ForecastResult>;
}

/// Coordinates as the weather service expects them: `lat,lng` in fixed-point
/// notation with six fractional digits.
pub fn format_geocode(lat: f64, lng: f64) -> String {
    format!("{lat:.6},{lng:.6}")
}
