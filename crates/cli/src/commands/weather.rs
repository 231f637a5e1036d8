//! Weather command handler.

use clap::Args;
use mandi_core::{config::AppConfig, AppResult};
use mandi_feeds::{create_weather_provider, current_for_all};
use mandi_reply::render_weather;

/// Show current weather for the configured cities
#[derive(Args, Debug)]
pub struct WeatherCommand {
    /// Only these cities, e.g. "Pune,IN" (default: configured list)
    #[arg(long)]
    pub city: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl WeatherCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing weather command");

        let provider = create_weather_provider(config)?;
        let cities = if self.city.is_empty() {
            &config.weather.cities
        } else {
            &self.city
        };

        let reports = current_for_all(provider.as_ref(), cities).await;

        if self.json {
            println!("{}", super::to_json(&reports)?);
        } else {
            println!("{}", render_weather(&reports));
        }

        Ok(())
    }
}
