//! External feeds for mandi: news headlines and current weather.
//!
//! Both collaborators sit behind traits so the reply path can be exercised
//! without network access. The news digest is guarded by a single-slot
//! [`NewsCache`] with an injectable [`Clock`].

pub mod cache;
pub mod clock;
pub mod factory;
pub mod news;
pub mod weather;

// Re-export main types
pub use cache::{NewsCache, NO_NEWS_MESSAGE};
pub use clock::{Clock, ManualClock, SystemClock};
pub use factory::{create_news_cache, create_news_source, create_weather_provider};
pub use news::{Headline, HeadlineGroup, HeadlineScraper, NewsDigest, NewsSource, RenderedNews};
pub use weather::{current_for_all, OpenWeatherClient, WeatherProvider, WeatherReport};
