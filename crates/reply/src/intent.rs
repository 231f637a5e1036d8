//! Query classification.
//!
//! Rules run in a fixed order on the lower-cased query and the first one
//! that yields an intent wins: weather keyword, news keyword, rate phrase.
//! Anything left over is [`Intent::Unrecognized`].

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// What a user message asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", content = "item", rename_all = "camelCase")]
pub enum Intent {
    Weather,
    News,
    /// Rate lookup for a cleaned item phrase (not yet alias-resolved)
    RateLookup(String),
    /// A rate/price phrase was present but named no item
    AmbiguousRateLookup,
    Unrecognized,
}

/// Classification rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    WeatherKeyword,
    NewsKeyword,
    RatePhrase,
}

pub const RULE_ORDER: [Rule; 3] = [Rule::WeatherKeyword, Rule::NewsKeyword, Rule::RatePhrase];

macro_rules! re {
    ($pat:expr) => {
        LazyLock::new(|| Regex::new($pat).expect("static regex"))
    };
}

/// "rate of X", "price X", "prices of X"
static LEADING_FORM: LazyLock<Regex> = re!(r"(?i)\b(?:rate|price)s?\s+(?:of\s+)?(.+)$");
/// "X rate", "X price today"
static TRAILING_FORM: LazyLock<Regex> = re!(r"(?i)^(.+?)\s+(?:rate|price)s?\b");
/// Trailing "on ..." / "for ..." qualifier, e.g. "on 12-06-2024", "for date 5th"
static DATE_QUALIFIER: LazyLock<Regex> = re!(r"(?i)(?:^|\s+)(?:on|for)(?:\s+.*)?$");
static TRAILING_TODAY: LazyLock<Regex> = re!(r"(?i)(?:^|\s+)today$");
/// Question lead-in left over by the trailing form, e.g. "what is the"
static QUESTION_FILLER: LazyLock<Regex> =
    re!(r"(?i)^(?:what(?:'s|’s|s|\s+is|\s+are)|tell\s+me|show\s+me|give\s+me)(?:\s+|$)");
/// A dangling article or "of", e.g. "rate of?"
static LEADING_FILLER_WORD: LazyLock<Regex> = re!(r"(?i)^(?:the|of)(?:\s+|$)");

/// Keyword and pattern based classifier.
#[derive(Debug, Clone)]
pub struct QueryParser {
    weather_keywords: Vec<String>,
    news_keywords: Vec<String>,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self {
            weather_keywords: vec!["weather".to_string(), "forecast".to_string()],
            news_keywords: vec!["news".to_string(), "headline".to_string()],
        }
    }
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a user message.
    ///
    /// # Arguments
    /// * `query` - Raw message text; case and surrounding whitespace are ignored
    ///
    /// # Returns
    /// The intent of the first rule in [`RULE_ORDER`] that matches, or
    /// [`Intent::Unrecognized`]. A rate lookup carries the cleaned,
    /// lower-cased item phrase.
    pub fn classify(&self, query: &str) -> Intent {
        let lowered = query.trim().to_lowercase();

        RULE_ORDER
            .iter()
            .find_map(|rule| self.apply(*rule, &lowered))
            .unwrap_or(Intent::Unrecognized)
    }

    /// Apply a single rule to an already lower-cased query.
    pub fn apply(&self, rule: Rule, lowered: &str) -> Option<Intent> {
        match rule {
            Rule::WeatherKeyword => {
                contains_any(lowered, &self.weather_keywords).then_some(Intent::Weather)
            }
            Rule::NewsKeyword => {
                contains_any(lowered, &self.news_keywords).then_some(Intent::News)
            }
            Rule::RatePhrase => rate_phrase(lowered),
        }
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Try the leading form, then the trailing form.
///
/// The first alternative whose capture survives cleanup wins. If some
/// alternative matched but all captures clean down to nothing the query is
/// ambiguous; if none matched the rule does not apply.
fn rate_phrase(lowered: &str) -> Option<Intent> {
    let captures = [
        LEADING_FORM.captures(lowered).and_then(|c| c.get(1)),
        TRAILING_FORM.captures(lowered).and_then(|c| c.get(1)),
    ];

    let mut matched = false;
    for capture in captures.into_iter().flatten() {
        matched = true;
        let phrase = clean_phrase(capture.as_str());
        if !phrase.is_empty() {
            return Some(Intent::RateLookup(phrase));
        }
    }

    matched.then_some(Intent::AmbiguousRateLookup)
}

/// Reduce a captured phrase to the item name.
///
/// Drops surrounding punctuation, a question lead-in ("what is the",
/// "tell me"), a dangling "the"/"of", a trailing "on/for ..." clause and a
/// trailing "today". A phrase made only of these cleans down to "".
pub fn clean_phrase(phrase: &str) -> String {
    let phrase = trim_punctuation(phrase);
    let phrase = QUESTION_FILLER.replace(phrase, "");
    let phrase = LEADING_FILLER_WORD.replace(phrase.trim(), "");
    let phrase = DATE_QUALIFIER.replace(phrase.trim(), "");
    let phrase = TRAILING_TODAY.replace(trim_punctuation(&phrase), "");
    trim_punctuation(&phrase).to_string()
}

fn trim_punctuation(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '!' | '.' | ',' | ';' | ':'))
        .trim()
}
