//! Dispatch from a classified query to a rendered reply.

use crate::format::{
    render_clarification_prompt, render_lookup, render_news, render_unrecognized_prompt,
    render_weather,
};
use crate::intent::{Intent, QueryParser};
use mandi_core::config::{RatesConfig, WeatherConfig};
use mandi_core::{AppConfig, AppResult};
use mandi_feeds::{
    create_news_cache, create_news_source, create_weather_provider, current_for_all, NewsCache,
    NewsSource, WeatherProvider,
};
use mandi_rates::{AliasTable, RateIndex};
use serde::Serialize;
use std::sync::Arc;

/// A reply in both renderings.
///
/// `rich` is only set when the reply carries markup (news links).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub intent: Intent,
    pub plain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich: Option<String>,
}

impl Reply {
    fn unformatted(intent: Intent, text: String) -> Self {
        Self {
            intent,
            plain: text,
            rich: None,
        }
    }

    /// The text to send over a transport with or without HTML support.
    pub fn text(&self, rich_supported: bool) -> &str {
        match (&self.rich, rich_supported) {
            (Some(rich), true) => rich,
            _ => &self.plain,
        }
    }
}

/// Answers free-text queries from the rate index and the external feeds.
pub struct Responder {
    index: Arc<RateIndex>,
    aliases: AliasTable,
    parser: QueryParser,
    piece_unit: String,
    news: Arc<dyn NewsSource>,
    news_cache: Arc<NewsCache>,
    weather: Arc<dyn WeatherProvider>,
    cities: Vec<String>,
}

impl Responder {
    /// Assemble a responder from explicit collaborators.
    ///
    /// The piece unit and the weather cities start at their configured
    /// defaults; override them with [`Self::with_piece_unit`] and
    /// [`Self::with_cities`].
    pub fn new(
        index: Arc<RateIndex>,
        aliases: AliasTable,
        news: Arc<dyn NewsSource>,
        news_cache: Arc<NewsCache>,
        weather: Arc<dyn WeatherProvider>,
    ) -> Self {
        Self {
            index,
            aliases,
            parser: QueryParser::new(),
            piece_unit: RatesConfig::default().piece_unit,
            news,
            news_cache,
            weather,
            cities: WeatherConfig::default().cities,
        }
    }

    /// Wire the production collaborators from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration (aliases, feeds, cities, piece unit)
    /// * `index` - Rate index built by ingestion, shared read-only
    ///
    /// # Errors
    /// Returns error if a news or weather client cannot be built, e.g. a
    /// malformed feed URL or a missing weather API key.
    pub fn from_config(config: &AppConfig, index: Arc<RateIndex>) -> AppResult<Self> {
        let responder = Self::new(
            index,
            mandi_rates::alias_table(config),
            create_news_source(config)?,
            create_news_cache(config),
            create_weather_provider(config)?,
        )
        .with_piece_unit(&config.rates.piece_unit)
        .with_cities(config.weather.cities.clone());

        Ok(responder)
    }

    pub fn with_piece_unit(mut self, piece_unit: &str) -> Self {
        self.piece_unit = piece_unit.to_string();
        self
    }

    pub fn with_cities(mut self, cities: Vec<String>) -> Self {
        self.cities = cities;
        self
    }

    pub fn index(&self) -> &RateIndex {
        &self.index
    }

    /// Answer one free-text query.
    ///
    /// Classifies the query, then answers from the rate index, the cached
    /// news digest or the weather provider.
    ///
    /// # Returns
    /// A [`Reply`] in plain text, plus an HTML rendering for news. Never
    /// fails: feed errors become fallback text and unknown items get the
    /// not-found message.
    pub async fn respond(&self, query: &str) -> Reply {
        let intent = self.parser.classify(query);
        tracing::debug!(?intent, "Classified query");

        match intent {
            Intent::Weather => {
                let reports = current_for_all(self.weather.as_ref(), &self.cities).await;
                tracing::info!(
                    "Weather reported for {}/{} cities",
                    reports.len(),
                    self.cities.len()
                );
                Reply::unformatted(Intent::Weather, render_weather(&reports))
            }
            Intent::News => {
                let news = self.news.clone();
                let rendered = self
                    .news_cache
                    .get(|| async move { news.fetch_digest().await.map(|d| render_news(&d)) })
                    .await;
                Reply {
                    intent: Intent::News,
                    plain: rendered.plain,
                    rich: Some(rendered.rich),
                }
            }
            Intent::RateLookup(phrase) => {
                let item = self.aliases.resolve(&phrase);
                let history = self.index.get(&item);
                tracing::info!(
                    "Rate lookup '{}' -> '{}' ({} entries)",
                    phrase,
                    item,
                    history.map(|h| h.len()).unwrap_or(0)
                );
                let text = render_lookup(&item, history, &self.piece_unit);
                Reply::unformatted(Intent::RateLookup(item), text)
            }
            Intent::AmbiguousRateLookup => {
                Reply::unformatted(Intent::AmbiguousRateLookup, render_clarification_prompt())
            }
            Intent::Unrecognized => {
                Reply::unformatted(Intent::Unrecognized, render_unrecognized_prompt())
            }
        }
    }
}
