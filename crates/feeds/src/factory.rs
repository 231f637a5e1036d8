//! Collaborator factory.
//!
//! Builds the news source, weather provider and news cache from the
//! application configuration.

use crate::cache::NewsCache;
use crate::news::{HeadlineScraper, NewsSource};
use crate::weather::{OpenWeatherClient, WeatherProvider};
use mandi_core::{AppConfig, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create the headline scraper for the configured news origin.
///
/// # Errors
/// Returns error if:
/// - The news origin is not a valid URL
/// - The headline link selector is not valid CSS
/// - The HTTP client cannot be built
pub fn create_news_source(config: &AppConfig) -> AppResult<Arc<dyn NewsSource>> {
    let scraper = HeadlineScraper::from_config(&config.news)?;
    Ok(Arc::new(scraper))
}

/// Create the weather client.
///
/// A missing API key is not fatal here: every weather request then fails
/// and the reply falls back to the "unavailable" message.
pub fn create_weather_provider(config: &AppConfig) -> AppResult<Arc<dyn WeatherProvider>> {
    let api_key = config.resolve_weather_key();
    if api_key.is_none() {
        tracing::warn!(
            "Environment variable {} is not set; weather lookups will be unavailable",
            config.weather.api_key_env
        );
    }

    let client = OpenWeatherClient::from_config(&config.weather, api_key)?;
    Ok(Arc::new(client))
}

/// Create the news cache with the configured freshness window.
pub fn create_news_cache(config: &AppConfig) -> Arc<NewsCache> {
    Arc::new(NewsCache::new(Duration::from_secs(config.news.ttl_secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_from_default_config() {
        let config = AppConfig::default();
        assert!(create_news_source(&config).is_ok());
        assert!(create_weather_provider(&config).is_ok());
    }

    #[test]
    fn test_invalid_news_origin() {
        let mut config = AppConfig::default();
        config.news.origin = "::::".to_string();
        match create_news_source(&config) {
            Err(err) => assert!(err.to_string().contains("Invalid news origin")),
            Ok(_) => panic!("Expected error for invalid origin"),
        }
    }
}
