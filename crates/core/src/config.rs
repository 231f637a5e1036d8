//! Configuration management for mandi.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`$MANDI_CONFIG` or `<workspace>/.mandi/config.yaml`)
//! - Environment variables
//! - Command-line flags (`with_overrides`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .mandi/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Rate ingestion settings
    pub rates: RatesConfig,

    /// Lowercase alias -> canonical item name
    pub aliases: BTreeMap<String, String>,

    /// News headline scraping settings
    pub news: NewsConfig,

    /// Weather provider settings
    pub weather: WeatherConfig,
}

/// Where and how market rate workbooks are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RatesConfig {
    /// Directory holding the workbooks; relative paths resolve against the workspace
    pub data_dir: PathBuf,

    /// Literal file name prefix a workbook must carry
    pub file_prefix: String,

    /// File name suffix, including the dot
    pub file_extension: String,

    /// Number of most recent records kept per item
    pub history_depth: usize,

    /// Unit descriptor that switches the table footer to per-piece phrasing
    pub piece_unit: String,

    /// Header names expected in each workbook
    pub columns: ColumnNames,
}

/// Header row names of a rate workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColumnNames {
    pub date: String,
    pub market: String,
    pub item: String,
    pub min_price: String,
    pub max_price: String,
    /// Optional column; rows default to an empty unit when it is absent
    pub unit: String,
}

/// News category: display name plus path under the news origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCategory {
    pub name: String,
    pub path: String,
}

/// Headline scraping and caching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsConfig {
    /// Origin that category paths and relative links resolve against
    pub origin: String,

    /// CSS selector matching headline anchors on a category page
    pub link_selector: String,

    pub categories: Vec<NewsCategory>,

    /// Freshness window of the cached digest
    pub ttl_secs: u64,

    /// Headlines kept per category
    pub max_headlines: usize,

    pub timeout_secs: u64,
}

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherConfig {
    pub endpoint: String,

    /// City identifiers in provider syntax, e.g. "Pune,IN"
    pub cities: Vec<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    pub timeout_secs: u64,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
    rates: Option<RatesConfig>,
    aliases: Option<BTreeMap<String, String>>,
    news: Option<NewsConfig>,
    weather: Option<WeatherConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("priceData"),
            file_prefix: "Pune_market_rates_".to_string(),
            file_extension: ".xlsx".to_string(),
            history_depth: 5,
            piece_unit: "नग".to_string(),
            columns: ColumnNames::default(),
        }
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            market: "Market".to_string(),
            item: "शेतिमाल".to_string(),
            min_price: "किमान".to_string(),
            max_price: "कमाल".to_string(),
            unit: "परिमाण".to_string(),
        }
    }
}

impl ColumnNames {
    /// Columns a workbook must carry to be ingested at all.
    pub fn required(&self) -> [&str; 5] {
        [
            self.date.as_str(),
            self.market.as_str(),
            self.item.as_str(),
            self.min_price.as_str(),
            self.max_price.as_str(),
        ]
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        let category = |name: &str, path: &str| NewsCategory {
            name: name.to_string(),
            path: path.to_string(),
        };

        Self {
            origin: "https://krishijagran.com".to_string(),
            link_selector: "h2 a".to_string(),
            categories: vec![
                category("Agriculture", "/agriculture-world/"),
                category("Market", "/commodity-news/"),
                category("Weather", "/weather/"),
            ],
            ttl_secs: 3600,
            max_headlines: 5,
            timeout_secs: 10,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            cities: ["Pune,IN", "Solapur,IN", "Nagpur,IN", "Mumbai,IN", "Nashik,IN"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Transliterated and English names for the commonly traded items.
pub fn default_aliases() -> BTreeMap<String, String> {
    [
        ("kanda", "कांदा"),
        ("onion", "कांदा"),
        ("batata", "बटाटा"),
        ("potato", "बटाटा"),
        ("bhindi", "भेंडी"),
        ("ladyfinger", "भेंडी"),
        ("ghevda", "घेवडा"),
        ("beans", "घेवडा"),
        ("gajar", "गाजर"),
        ("carrot", "गाजर"),
        ("vangi", "वांगी"),
        ("brinjal", "वांगी"),
        ("lasun", "लसूण"),
        ("garlic", "लसूण"),
        ("aale", "आले"),
        ("ginger", "आले"),
        ("tamatar", "टोमॅटो"),
        ("tomato", "टोमॅटो"),
    ]
    .iter()
    .map(|(alias, item)| (alias.to_string(), item.to_string()))
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            rates: RatesConfig::default(),
            aliases: default_aliases(),
            news: NewsConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `MANDI_WORKSPACE`: Override workspace path
    /// - `MANDI_CONFIG`: Path to config file
    /// - `MANDI_DATA_DIR`: Directory holding the rate workbooks
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let workspace = std::env::var("MANDI_WORKSPACE").ok().map(PathBuf::from);
        let config_file = std::env::var("MANDI_CONFIG").ok().map(PathBuf::from);
        Self::load_with(workspace, config_file)
    }

    /// Load configuration for an explicit workspace and config file.
    ///
    /// # Arguments
    /// * `workspace` - Workspace root (defaults to the current directory)
    /// * `config_file` - YAML file to merge (defaults to `.mandi/config.yaml`)
    ///
    /// # Errors
    /// Returns error if:
    /// - The workspace directory does not exist
    /// - An explicitly named config file does not exist
    /// - The config file cannot be read or parsed
    ///
    /// A missing config file at the default location is not an error.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => {
                if !cf.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        cf
                    )));
                }
                cf.clone()
            }
            None => config.mandi_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        if let Ok(data_dir) = std::env::var("MANDI_DATA_DIR") {
            config.rates.data_dir = PathBuf::from(data_dir);
        }

        if config.log_level.is_none() {
            config.log_level = std::env::var("RUST_LOG").ok();
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        tracing::debug!("Merging config file {:?}", path);

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(rates) = config_file.rates {
            result.rates = rates;
        }

        // Configured aliases extend the built-in table rather than replace it
        if let Some(aliases) = config_file.aliases {
            for (alias, item) in aliases {
                result.aliases.insert(alias.to_lowercase(), item);
            }
        }

        if let Some(news) = config_file.news {
            result.news = news;
        }

        if let Some(weather) = config_file.weather {
            result.weather = weather;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.rates.data_dir = data_dir;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .mandi directory.
    pub fn mandi_dir(&self) -> PathBuf {
        self.workspace.join(".mandi")
    }

    /// Rate data directory, resolved against the workspace when relative.
    pub fn data_dir(&self) -> PathBuf {
        if self.rates.data_dir.is_absolute() {
            self.rates.data_dir.clone()
        } else {
            self.workspace.join(&self.rates.data_dir)
        }
    }

    /// Resolve the weather API key from the configured environment variable.
    pub fn resolve_weather_key(&self) -> Option<String> {
        std::env::var(&self.weather.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate settings that would otherwise fail at request time.
    pub fn validate(&self) -> AppResult<()> {
        if self.rates.history_depth == 0 {
            return Err(AppError::Config(
                "rates.historyDepth must be at least 1".to_string(),
            ));
        }

        if self.rates.file_extension.is_empty() {
            return Err(AppError::Config(
                "rates.fileExtension must not be empty".to_string(),
            ));
        }

        if self.news.ttl_secs == 0 {
            return Err(AppError::Config("news.ttlSecs must be positive".to_string()));
        }

        if self.news.max_headlines == 0 {
            return Err(AppError::Config(
                "news.maxHeadlines must be at least 1".to_string(),
            ));
        }

        if self.weather.cities.is_empty() {
            return Err(AppError::Config(
                "weather.cities must list at least one city".to_string(),
            ));
        }

        Ok(())
    }
}
