// OpenWeather air-pollution client
use crate::application::error::UpstreamError;
use crate::application::pollution_provider::PollutionProvider;
use crate::domain::air_quality::{Components, PollutantReading};
use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OwResponse {
    #[serde(default)]
    list: Option<Vec<OwSample>>,
}

#[derive(Debug, Deserialize)]
struct OwSample {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    components: OwComponents,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    aqi: u8,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OwComponents {
    co: f64,
    no: f64,
    no2: f64,
    o3: f64,
    so2: f64,
    pm2_5: f64,
    pm10: f64,
    nh3: f64,
}

impl OpenWeatherClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build OpenWeather HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn fetch(&self, path: &str, lat: f64, lon: f64) -> Result<Option<Vec<PollutantReading>>, UpstreamError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Requesting {} for ({}, {})", url, lat, lon);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| unavailable(format!("request to {} failed", path), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "{} responded with status {}",
                path, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| unavailable(format!("reading {} body failed", path), e))?;

        parse_samples(&body)
    }
}

/// The request URL carries the API key, so it is stripped from the error.
fn unavailable(context: String, error: reqwest::Error) -> UpstreamError {
    UpstreamError::Unavailable(format!("{}: {}", context, error.without_url()))
}

/// Decode a provider body. Invalid JSON counts as an unavailable upstream;
/// valid JSON with broken samples is a format error.
fn parse_samples(body: &str) -> Result<Option<Vec<PollutantReading>>, UpstreamError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| UpstreamError::Unavailable(format!("response is not JSON: {}", e)))?;
    let parsed: OwResponse = serde_json::from_value(value)
        .map_err(|e| UpstreamError::Format(format!("Invalid sample in air pollution response: {}", e)))?;

    let Some(list) = parsed.list else {
        return Ok(None);
    };

    list.into_iter()
        .map(|s| {
            let timestamp = DateTime::from_timestamp(s.dt, 0)
                .ok_or_else(|| UpstreamError::Format(format!("Invalid sample timestamp: {}", s.dt)))?;
            let c = s.components;
            Ok(PollutantReading::new(
                s.main.aqi,
                Components {
                    co: c.co,
                    no: c.no,
                    no2: c.no2,
                    o3: c.o3,
                    so2: c.so2,
                    pm2_5: c.pm2_5,
                    pm10: c.pm10,
                    nh3: c.nh3,
                },
                timestamp,
            ))
        })
        .collect::<Result<Vec<_>, UpstreamError>>()
        .map(Some)
}

#[async_trait]
impl PollutionProvider for OpenWeatherClient {
    async fn current(&self, lat: f64, lon: f64) -> Result<Option<Vec<PollutantReading>>, UpstreamError> {
        self.fetch("air_pollution", lat, lon).await
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<Option<Vec<PollutantReading>>, UpstreamError> {
        self.fetch("air_pollution/forecast", lat, lon).await
    }
}
