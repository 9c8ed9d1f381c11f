use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use crate::{
    config::Config,
    error::{AppError, AppResult, UpstreamService},
    http::{build_client, fetch_body},
    model::{DailyForecast, ForecastResult, WeatherObservation},
};

use super::{WeatherProvider, format_geocode};

const SERVICE: UpstreamService = UpstreamService::Weather;

const CURRENT_PATH: &str = "api/weather/v2/observations/current";
const FORECAST_PATH: &str = "api/weather/v2/forecast/daily/10day";

/// Metric units; the response is then keyed under `metric`.
const UNITS: &str = "m";

/// The Weather Company data API (Weather Insights v2).
#[derive(Debug, Clone)]
pub struct WeatherCompanyProvider {
    base_url: String,
    credentials: Option<(String, Option<String>)>,
    language: String,
    http: Client,
}

impl WeatherCompanyProvider {
    pub fn new(
        base_url: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials: None,
            language: language.into(),
            http: build_client(SERVICE, timeout)?,
        })
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password));
        self
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let weather = &config.weather;
        let mut provider = Self::new(
            config.weather_base_url()?,
            weather.language.clone(),
            Duration::from_secs(weather.timeout_secs),
        )?;

        if let Some(username) = weather.username.clone() {
            provider = provider.with_basic_auth(username, weather.password.clone());
        }

        Ok(provider)
    }

    fn request(&self, path: &str, lat: f64, lng: f64) -> RequestBuilder {
        let geocode = format_geocode(lat, lng);
        let url = format!("{}/{}", self.base_url, path);

        tracing::debug!(%url, %geocode, "requesting weather data");

        let request = self.http.get(url).query(&[
            ("units", UNITS),
            ("language", self.language.as_str()),
            ("geocode", geocode.as_str()),
        ]);

        match &self.credentials {
            Some((username, password)) => request.basic_auth(username, password.as_deref()),
            None => request,
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherCompanyProvider {
    async fn current_conditions(&self, lat: f64, lng: f64) -> AppResult<WeatherObservation> {
        let request = self.request(CURRENT_PATH, lat, lng);
        let body = fetch_body(request, SERVICE, "current conditions").await?;
        parse_current(&body)
    }

    async fn daily_forecast(&self, lat: f64, lng: f64) -> AppResult<ForecastResult> {
        let request = self.request(FORECAST_PATH, lat, lng);
        let body = fetch_body(request, SERVICE, "daily forecast").await?;
        parse_forecast(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TwcMetric {
    temp: Option<f64>,
    feels_like: Option<f64>,
    rh: Option<u8>,
    wspd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TwcObservation {
    obs_time: Option<i64>,
    phrase_32char: Option<String>,
    wx_phrase: Option<String>,
    metric: Option<TwcMetric>,
    // Newer payloads put the values directly on the observation.
    temp: Option<f64>,
    feels_like: Option<f64>,
    rh: Option<u8>,
    wspd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TwcCurrentResponse {
    observation: TwcObservation,
}

#[derive(Debug, Deserialize)]
struct TwcDayPart {
    phrase_32char: Option<String>,
    pop: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct TwcDailyForecast {
    fcst_valid: Option<i64>,
    fcst_valid_local: Option<String>,
    dow: Option<String>,
    max_temp: Option<f64>,
    min_temp: Option<f64>,
    narrative: Option<String>,
    day: Option<TwcDayPart>,
    night: Option<TwcDayPart>,
}

#[derive(Debug, Deserialize)]
struct TwcForecastResponse {
    forecasts: Vec<TwcDailyForecast>,
}

fn parse_current(body: &str) -> AppResult<WeatherObservation> {
    let parsed: TwcCurrentResponse = serde_json::from_str(body).map_err(|e| {
        AppError::upstream(SERVICE, format!("Failed to parse current conditions JSON: {e}"))
    })?;

    let obs = parsed.observation;
    let metric = obs.metric.unwrap_or_default();

    let temp_c = metric.temp.or(obs.temp).ok_or_else(|| {
        AppError::upstream(SERVICE, "Current conditions contained no temperature")
    })?;

    Ok(WeatherObservation {
        temp_c,
        feels_like_c: metric.feels_like.or(obs.feels_like),
        condition: obs.phrase_32char.or(obs.wx_phrase),
        humidity_pct: metric.rh.or(obs.rh),
        wind_speed_kmh: metric.wspd.or(obs.wspd),
        observed_at: obs.obs_time.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
    })
}

fn parse_forecast(body: &str) -> AppResult<ForecastResult> {
    let parsed: TwcForecastResponse = serde_json::from_str(body).map_err(|e| {
        AppError::upstream(SERVICE, format!("Failed to parse daily forecast JSON: {e}"))
    })?;

    let days = parsed
        .forecasts
        .into_iter()
        .map(|f| {
            let date = f
                .fcst_valid_local
                .as_deref()
                .and_then(local_date)
                .or_else(|| {
                    f.fcst_valid
                        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
                        .map(|dt| dt.date_naive())
                });

            let day_of_week = f
                .dow
                .or_else(|| date.map(|d| d.weekday().to_string()))
                .unwrap_or_default();

            // Once the day part is over only the night part is populated.
            let part = f.day.or(f.night);

            DailyForecast {
                date,
                day_of_week,
                max_c: f.max_temp,
                min_c: f.min_temp,
                narrative: f.narrative.unwrap_or_default(),
                day_condition: part.as_ref().and_then(|p| p.phrase_32char.clone()),
                precip_chance_pct: part.as_ref().and_then(|p| p.pop),
            }
        })
        .collect();

    Ok(ForecastResult { days })
}

/// Date part of a local timestamp such as `2016-06-03T07:00:00-0400`.
fn local_date(value: &str) -> Option<NaiveDate> {
    value
        .get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}
