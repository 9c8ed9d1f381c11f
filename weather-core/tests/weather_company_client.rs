//! Integration tests for WeatherCompanyProvider using wiremock.

use std::time::Duration;

use weather_core::{AppError, UpstreamService, WeatherCompanyProvider, WeatherProvider};
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> WeatherCompanyProvider {
    WeatherCompanyProvider::new(server.uri(), "en-US", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn current_conditions_sends_metric_locale_and_geocode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/v2/observations/current"))
        .and(query_param("units", "m"))
        .and(query_param("language", "en-US"))
        .and(query_param("geocode", "48.850000,2.350000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "metadata": {"units": "m"},
            "observation": {
                "obs_time": 1464955200,
                "phrase_32char": "Fair",
                "metric": {"temp": 18, "feels_like": 18, "rh": 50, "wspd": 7}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let obs = provider(&server).current_conditions(48.85, 2.35).await.unwrap();

    assert_eq!(obs.temp_c, 18.0);
    assert_eq!(obs.condition.as_deref(), Some("Fair"));
}

#[tokio::test]
async fn daily_forecast_uses_ten_day_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/v2/forecast/daily/10day"))
        .and(query_param("geocode", "-33.868800,151.209300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "forecasts": [
                {"fcst_valid_local": "2016-06-03T07:00:00+1000", "dow": "Friday",
                 "max_temp": 19, "min_temp": 11, "narrative": "Showers."},
                {"fcst_valid_local": "2016-06-04T07:00:00+1000", "dow": "Saturday",
                 "max_temp": 20, "min_temp": 12, "narrative": "Sunny."}
            ]
        })))
        .mount(&server)
        .await;

    let forecast = provider(&server)
        .daily_forecast(-33.8688, 151.2093)
        .await
        .unwrap();

    assert_eq!(forecast.days.len(), 2);
    assert_eq!(forecast.days[1].day_of_week, "Saturday");
    assert_eq!(forecast.days[1].max_c, Some(20.0));
}

#[tokio::test]
async fn basic_auth_credentials_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/v2/observations/current"))
        .and(basic_auth("user", "pass"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "observation": {"metric": {"temp": 5}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let obs = provider(&server)
        .with_basic_auth("user", Some("pass".to_string()))
        .current_conditions(1.0, 2.0)
        .await
        .unwrap();

    assert_eq!(obs.temp_c, 5.0);
}

#[tokio::test]
async fn unauthorized_is_upstream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = provider(&server).daily_forecast(0.0, 0.0).await.unwrap_err();

    match err {
        AppError::UpstreamUnavailable { service, detail } => {
            assert_eq!(service, UpstreamService::Weather);
            assert!(detail.contains("401"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_upstream_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server).current_conditions(0.0, 0.0).await.unwrap_err();
    assert_eq!(err.to_string(), "Could not connect to Weather API.");
}
