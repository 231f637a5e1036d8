//! Current weather from the OpenWeatherMap API.
//!
//! API: https://openweathermap.org/current

use futures::future::join_all;
use mandi_core::config::WeatherConfig;
use mandi_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,

    /// Provider condition label, e.g. "Rain", "Clear", "Clouds", "Haze"
    pub condition: String,

    /// Degrees Celsius
    pub temperature: f64,

    /// Degrees Celsius
    pub feels_like: f64,

    /// Percent
    pub humidity: f64,
}

/// Source of current weather reports.
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, city: &str) -> AppResult<WeatherReport>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

/// OpenWeatherMap client.
pub struct OpenWeatherClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn from_config(config: &WeatherConfig, api_key: Option<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> AppResult<WeatherReport> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("Weather API key is not configured".to_string()))?;

        tracing::debug!("Requesting weather for {}", city);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Weather request for {} failed: {}", city, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "Weather API returned {} for {}",
                response.status(),
                city
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read weather for {}: {}", city, e)))?;

        decode_report(city, &body)
    }
}

/// Decode a current-weather payload.
pub fn decode_report(city: &str, body: &str) -> AppResult<WeatherReport> {
    let payload: OwmResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Parse(format!("Unexpected weather payload for {}: {}", city, e)))?;

    let condition = payload
        .weather
        .into_iter()
        .next()
        .map(|w| w.main)
        .ok_or_else(|| AppError::Parse(format!("No weather condition for {}", city)))?;

    Ok(WeatherReport {
        city: city.to_string(),
        condition,
        temperature: payload.main.temp,
        feels_like: payload.main.feels_like,
        humidity: payload.main.humidity,
    })
}

/// Fetch every city concurrently, skipping the ones that fail.
pub async fn current_for_all(provider: &dyn WeatherProvider, cities: &[String]) -> Vec<WeatherReport> {
    let results = join_all(cities.iter().map(|city| provider.current(city))).await;

    cities
        .iter()
        .zip(results)
        .filter_map(|(city, result)| match result {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("Could not fetch weather for {}: {}", city, e);
                None
            }
        })
        .collect()
}
