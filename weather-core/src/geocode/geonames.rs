use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::Config,
    error::{AppError, AppResult, UpstreamService},
    http::{build_client, fetch_body},
    markup,
    model::{ExternalId, LocationDetails, SearchResult},
};

use super::Geocoder;

const SERVICE: UpstreamService = UpstreamService::Geonames;

/// Client for the GeoNames XML web services.
#[derive(Debug, Clone)]
pub struct GeonamesClient {
    base_url: String,
    username: String,
    max_rows: u32,
    http: Client,
}

impl GeonamesClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        max_rows: u32,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            max_rows,
            http: build_client(SERVICE, timeout)?,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Self::new(
            config.geonames.base_url.clone(),
            config.geonames_username()?,
            config.geonames.max_rows,
            Duration::from_secs(config.geonames.timeout_secs),
        )?;
        Ok(client)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl Geocoder for GeonamesClient {
    async fn search_by_name(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        let query = markup::clean(query);
        let max_rows = self.max_rows.to_string();

        tracing::debug!(%query, "searching GeoNames");

        let body = fetch_body(
            self.http.get(self.endpoint("search")).query(&[
                ("q", query.as_str()),
                ("maxRows", max_rows.as_str()),
                ("username", self.username.as_str()),
            ]),
            SERVICE,
            "search",
        )
        .await?;

        let mut results = parse_search(&body)?;
        results.truncate(self.max_rows as usize);
        Ok(results)
    }

    async fn get_by_external_id(&self, id: ExternalId) -> AppResult<LocationDetails> {
        let geoname_id = id.to_string();

        tracing::debug!(%id, "resolving GeoNames id");

        let body = fetch_body(
            self.http.get(self.endpoint("get")).query(&[
                ("geonameId", geoname_id.as_str()),
                ("username", self.username.as_str()),
            ]),
            SERVICE,
            "get",
        )
        .await?;

        parse_get(&body)
    }
}

/// In-band error report, e.g. `<status message="user does not exist." value="10"/>`.
#[derive(Debug, Deserialize)]
struct GnStatus {
    message: String,
    value: Option<i64>,
}

impl GnStatus {
    fn into_error(self) -> AppError {
        match self.value {
            Some(code) => {
                AppError::upstream(SERVICE, format!("GeoNames error {code}: {}", self.message))
            }
            None => AppError::upstream(SERVICE, format!("GeoNames error: {}", self.message)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GnSearchEntry {
    #[serde(rename = "geonameId")]
    geoname_id: i64,
    #[serde(default)]
    name: String,
    #[serde(rename = "countryName", default)]
    country_name: String,
}

#[derive(Debug, Deserialize)]
struct GnSearchResponse {
    #[serde(rename = "geoname", default)]
    geonames: Vec<GnSearchEntry>,
    status: Option<GnStatus>,
}

/// Either a `<geoname>` document or a `<geonames>` wrapper around a status.
#[derive(Debug, Deserialize)]
struct GnGetResponse {
    #[serde(rename = "geonameId")]
    geoname_id: Option<i64>,
    name: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    status: Option<GnStatus>,
}

fn parse_search(xml: &str) -> AppResult<Vec<SearchResult>> {
    let parsed: GnSearchResponse = serde_xml_rs::from_str(xml).map_err(|e| {
        AppError::upstream(SERVICE, format!("Failed to parse GeoNames search XML: {e}"))
    })?;

    if let Some(status) = parsed.status {
        return Err(status.into_error());
    }

    Ok(parsed
        .geonames
        .into_iter()
        .map(|g| SearchResult {
            external_id: ExternalId(g.geoname_id),
            name: markup::clean(&g.name),
            country: markup::clean(&g.country_name),
        })
        .collect())
}

fn parse_get(xml: &str) -> AppResult<LocationDetails> {
    let parsed: GnGetResponse = serde_xml_rs::from_str(xml).map_err(|e| {
        AppError::upstream(SERVICE, format!("Failed to parse GeoNames get XML: {e}"))
    })?;

    if let Some(status) = parsed.status {
        return Err(status.into_error());
    }

    let missing = |field: &str| {
        AppError::upstream(SERVICE, format!("GeoNames get response has no {field}"))
    };

    Ok(LocationDetails {
        external_id: ExternalId(parsed.geoname_id.ok_or_else(|| missing("geonameId"))?),
        name: markup::clean(&parsed.name.ok_or_else(|| missing("name"))?),
        country_code: markup::clean(parsed.country_code.as_deref().unwrap_or_default()),
        lat: parsed.lat.ok_or_else(|| missing("lat"))?,
        lng: parsed.lng.ok_or_else(|| missing("lng"))?,
    })
}
