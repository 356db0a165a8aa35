//! Page renderers: turn a product URL into page source.

pub mod http;
pub mod webdriver;

use crate::config::Config;
use crate::error::RenderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpRenderer;
pub use webdriver::WebDriverRenderer;

/// Trait for fetching rendered pages - enables mocking for tests.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Loads `url` and returns the page source once the body is present.
    async fn render(&self, url: &str) -> Result<String, RenderError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Which renderer to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Real browser over WebDriver (runs page scripts)
    #[default]
    WebDriver,
    /// Plain HTTP GET with browser emulation
    Http,
}

impl std::str::FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "webdriver" | "browser" => Ok(RendererKind::WebDriver),
            "http" => Ok(RendererKind::Http),
            _ => Err(format!("Unknown renderer: {}. Use: webdriver, http", s)),
        }
    }
}

impl std::fmt::Display for RendererKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RendererKind::WebDriver => write!(f, "webdriver"),
            RendererKind::Http => write!(f, "http"),
        }
    }
}

/// Builds the renderer selected in the configuration.
pub fn from_config(config: &Config) -> Result<Box<dyn PageRenderer>, RenderError> {
    Ok(match config.renderer {
        RendererKind::WebDriver => Box::new(WebDriverRenderer::new(config)),
        RendererKind::Http => Box::new(HttpRenderer::new(config)?),
    })
}
