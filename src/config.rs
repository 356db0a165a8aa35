//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::extract::{PriceExtractor, ScanMode, DEFAULT_CURRENCY};
use crate::models::StoreTarget;
use crate::render::RendererKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How product pages are rendered
    #[serde(default)]
    pub renderer: RendererKind,

    /// WebDriver endpoint (chromedriver, geckodriver, selenium)
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Seconds to wait for a page to become ready
    #[serde(default = "default_render_timeout_secs")]
    pub render_timeout_secs: u64,

    /// Proxy URL for the HTTP renderer (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Delay before each HTTP request in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Currency symbol prefixing prices on store pages
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Which part of the page is scanned for prices
    #[serde(default)]
    pub scan: ScanMode,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Stores in comparison order
    #[serde(default = "default_stores")]
    pub stores: Vec<StoreTarget>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("price_data.db")
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_render_timeout_secs() -> u64 {
    10
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_stores() -> Vec<StoreTarget> {
    ["Dmart", "Jiomart", "BigBasket"].into_iter().map(|name| StoreTarget::new(name, "")).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            renderer: RendererKind::WebDriver,
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            render_timeout_secs: default_render_timeout_secs(),
            proxy: None,
            delay_ms: 0,
            delay_jitter_ms: 0,
            currency_symbol: default_currency_symbol(),
            scan: ScanMode::Markup,
            format: OutputFormat::Table,
            stores: default_stores(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("pricewise").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(db) = std::env::var("PRICEWISE_DB") {
            self.db_path = PathBuf::from(db);
        }

        if let Ok(url) = std::env::var("PRICEWISE_WEBDRIVER") {
            self.webdriver_url = url;
        }

        if let Ok(renderer) = std::env::var("PRICEWISE_RENDERER") {
            if let Ok(r) = renderer.parse() {
                self.renderer = r;
            }
        }

        if let Ok(proxy) = std::env::var("PRICEWISE_PROXY") {
            self.proxy = Some(proxy);
        }

        self
    }

    /// Page-ready timeout as a duration.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Builds the price extractor for the configured currency and scan mode.
    pub fn extractor(&self) -> Result<PriceExtractor> {
        PriceExtractor::new(&self.currency_symbol, self.scan).with_context(|| {
            format!("Invalid currency symbol: '{}'", self.currency_symbol)
        })
    }

    /// Merges `NAME=URL` overrides into the configured stores.
    ///
    /// A name matching a configured store (case-insensitively) sets its URL
    /// in place; unknown names are appended in the order given.
    pub fn merge_targets(&mut self, overrides: Vec<StoreTarget>) {
        for target in overrides {
            match self.stores.iter_mut().find(|s| s.name.eq_ignore_ascii_case(&target.name)) {
                Some(existing) => existing.url = target.url,
                None => self.stores.push(target),
            }
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
