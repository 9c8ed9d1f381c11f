use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::AppResult,
    model::{ExternalId, LocationDetails, SearchResult},
};

pub mod geonames;

pub use geonames::GeonamesClient;

/// Name search and id resolution against a geocoding service.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Free-text place search. Markup in `query` is removed before sending.
    async fn search_by_name(&self, query: &str) -> AppResult<Vec<SearchResult>>;

    async fn get_by_external_id(&self, id: ExternalId) -> AppResult<LocationDetails>;
}
