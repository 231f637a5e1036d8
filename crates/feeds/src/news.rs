//! Agricultural news headlines scraped from category pages.
//!
//! Each configured category is fetched independently. A category that fails
//! is left out of the digest; the digest only fails when every category does.

use futures::future::join_all;
use mandi_core::config::{NewsCategory, NewsConfig};
use mandi_core::{AppError, AppResult};
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// A single headline with an absolute link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

/// Headlines of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlineGroup {
    pub category: String,
    pub headlines: Vec<Headline>,
}

/// Headlines grouped by category, in configured category order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NewsDigest {
    pub groups: Vec<HeadlineGroup>,
}

impl NewsDigest {
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.headlines.is_empty())
    }
}

/// A digest rendered for both kinds of transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedNews {
    /// HTML hyperlink markup
    pub rich: String,

    /// Markup stripped, links printed as text
    pub plain: String,
}

impl RenderedNews {
    pub fn is_empty(&self) -> bool {
        self.rich.trim().is_empty() && self.plain.trim().is_empty()
    }
}

/// Producer of news digests.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch every category; fails only when no category yields headlines.
    async fn fetch_digest(&self) -> AppResult<NewsDigest>;
}

/// Scrapes headline anchors from category pages under a fixed origin.
pub struct HeadlineScraper {
    client: reqwest::Client,
    origin: Url,
    selector: String,
    categories: Vec<NewsCategory>,
    max_headlines: usize,
}

impl HeadlineScraper {
    pub fn from_config(config: &NewsConfig) -> AppResult<Self> {
        let origin = Url::parse(&config.origin).map_err(|e| {
            AppError::Config(format!("Invalid news origin '{}': {}", config.origin, e))
        })?;

        // Fail at startup rather than on every request
        parse_selector(&config.link_selector)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            origin,
            selector: config.link_selector.clone(),
            categories: config.categories.clone(),
            max_headlines: config.max_headlines,
        })
    }

    async fn fetch_category(&self, category: &NewsCategory) -> AppResult<Vec<Headline>> {
        let url = self.origin.join(&category.path).map_err(|e| {
            AppError::Config(format!("Invalid path for '{}': {}", category.name, e))
        })?;

        tracing::debug!("Fetching {} headlines from {}", category.name, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read {}: {}", url, e)))?;

        let headlines = extract_headlines(&body, &self.selector, &self.origin, self.max_headlines)?;
        if headlines.is_empty() {
            return Err(AppError::Parse(format!(
                "No headlines matching '{}' on {}",
                self.selector, url
            )));
        }

        Ok(headlines)
    }
}

#[async_trait::async_trait]
impl NewsSource for HeadlineScraper {
    async fn fetch_digest(&self) -> AppResult<NewsDigest> {
        tracing::info!("Fetching news for {} categories", self.categories.len());

        let results = join_all(self.categories.iter().map(|c| self.fetch_category(c))).await;

        collect_digest(self.categories.iter().cloned().zip(results))
    }
}

/// Keep categories that produced headlines; fail when none did.
pub fn collect_digest<I>(results: I) -> AppResult<NewsDigest>
where
    I: IntoIterator<Item = (NewsCategory, AppResult<Vec<Headline>>)>,
{
    let mut groups = Vec::new();
    let mut failures = 0usize;

    for (category, result) in results {
        match result {
            Ok(headlines) if !headlines.is_empty() => groups.push(HeadlineGroup {
                category: category.name,
                headlines,
            }),
            Ok(_) => {
                tracing::warn!("No headlines for category '{}'", category.name);
                failures += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping news category '{}': {}", category.name, e);
                failures += 1;
            }
        }
    }

    if groups.is_empty() {
        return Err(AppError::Fetch(format!(
            "All {} news categories failed",
            failures
        )));
    }

    Ok(NewsDigest { groups })
}

fn parse_selector(selector: &str) -> AppResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| AppError::Config(format!("Invalid CSS selector '{}': {:?}", selector, e)))
}

/// Pull up to `max` (title, absolute link) pairs out of a page.
///
/// # Arguments
/// * `html` - Page body
/// * `selector` - CSS selector for the headline anchors
/// * `origin` - Base URL that relative links resolve against
/// * `max` - Upper bound on the number of headlines kept
///
/// # Returns
/// Headlines in document order. Anchors without text or href are skipped,
/// and so are repeated links.
///
/// # Errors
/// Returns a config error if `selector` is not valid CSS.
pub fn extract_headlines(
    html: &str,
    selector: &str,
    origin: &Url,
    max: usize,
) -> AppResult<Vec<Headline>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    let headlines = document
        .select(&selector)
        .filter_map(|element| {
            let title = element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ");
            let href = element.value().attr("href")?;

            if title.is_empty() {
                return None;
            }

            let link = origin.join(href.trim()).ok()?.to_string();
            Some(Headline { title, link })
        })
        .filter(|headline| seen.insert(headline.link.clone()))
        .take(max)
        .collect();

    Ok(headlines)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h2><a href="/news/onion-prices-rise">Onion prices  rise
              in Lasalgaon</a></h2>
          <h2><a href="https://example.org/monsoon">Monsoon reaches Kerala</a></h2>
          <h2><a href="/news/onion-prices-rise">Onion prices rise in Lasalgaon</a></h2>
          <h2><a href="/news/empty">   </a></h2>
          <h2><a>No link here</a></h2>
          <h2><a href="relative/tomato">Tomato glut</a></h2>
          <h3><a href="/news/ignored">Not a headline</a></h3>
        </body></html>
    "#;

    fn origin() -> Url {
        Url::parse("https://krishijagran.com").unwrap()
    }

    fn category(name: &str) -> NewsCategory {
        NewsCategory {
            name: name.to_string(),
            path: format!("/{}/", name.to_lowercase()),
        }
    }

    fn headline(title: &str) -> Headline {
        Headline {
            title: title.to_string(),
            link: format!("https://krishijagran.com/{}", title.replace(' ', "-")),
        }
    }

    #[test]
    fn test_extract_resolves_and_filters() {
        let headlines = extract_headlines(PAGE, "h2 a", &origin(), 5).unwrap();

        assert_eq!(
            headlines,
            vec![
                Headline {
                    title: "Onion prices rise in Lasalgaon".to_string(),
                    link: "https://krishijagran.com/news/onion-prices-rise".to_string(),
                },
                Headline {
                    title: "Monsoon reaches Kerala".to_string(),
                    link: "https://example.org/monsoon".to_string(),
                },
                Headline {
                    title: "Tomato glut".to_string(),
                    link: "https://krishijagran.com/relative/tomato".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_extract_respects_limit() {
        let headlines = extract_headlines(PAGE, "h2 a", &origin(), 1).unwrap();
        assert_eq!(headlines.len(), 1);
    }

    #[test]
    fn test_extract_rejects_bad_selector() {
        assert!(extract_headlines(PAGE, "h2 >>> a[", &origin(), 5).is_err());
    }

    #[test]
    fn test_collect_omits_failed_categories() {
        let digest = collect_digest(vec![
            (category("Agriculture"), Ok(vec![headline("Kharif sowing")])),
            (
                category("Market"),
                Err(AppError::Fetch("connection refused".to_string())),
            ),
            (category("Weather"), Ok(vec![])),
        ])
        .unwrap();

        assert_eq!(digest.groups.len(), 1);
        assert_eq!(digest.groups[0].category, "Agriculture");
        assert!(!digest.is_empty());
    }

    #[test]
    fn test_collect_fails_when_every_category_fails() {
        let result = collect_digest(vec![
            (category("Agriculture"), Err(AppError::Fetch("timeout".to_string()))),
            (category("Market"), Err(AppError::Parse("no anchors".to_string()))),
        ]);

        assert!(matches!(result, Err(AppError::Fetch(_))));
    }

    #[test]
    fn test_scraper_rejects_invalid_config() {
        let mut config = NewsConfig::default();
        config.origin = "not a url".to_string();
        assert!(HeadlineScraper::from_config(&config).is_err());

        let mut config = NewsConfig::default();
        config.link_selector = "[[".to_string();
        assert!(HeadlineScraper::from_config(&config).is_err());

        assert!(HeadlineScraper::from_config(&NewsConfig::default()).is_ok());
    }

    #[test]
    fn test_rendered_news_emptiness() {
        assert!(RenderedNews::default().is_empty());
        let rendered = RenderedNews {
            rich: "<b>x</b>".to_string(),
            plain: "x".to_string(),
        };
        assert!(!rendered.is_empty());
    }
}
