//! Core library for the `weather-web` application.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the geocoding and weather services
//! - The bounded location store
//! - The workflows behind each page
//!
//! It is used by `weather-web`, but holds no HTTP-server or HTML concerns.

pub mod config;
pub mod error;
pub mod geocode;
mod http;
pub mod markup;
pub mod model;
pub mod provider;
pub mod store;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, AppResult, UpstreamService};
pub use geocode::{Geocoder, GeonamesClient};
pub use model::{
    DailyForecast, ExternalId, ForecastResult, Location, LocationDetails, LocationForecast,
    LocationId, LocationWeather, SearchPage, SearchResult, WeatherObservation,
};
pub use provider::{WeatherCompanyProvider, WeatherProvider};
pub use store::{DocumentStore, LocationStore, MAX_LOCATIONS};
pub use workflow::Workflows;
