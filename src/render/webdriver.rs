//! Browser renderer driven over the WebDriver protocol.
//!
//! Each render opens its own session and closes it afterwards, whether the
//! page loaded or not, so a failing store never leaks a browser.

use super::PageRenderer;
use crate::config::Config;
use crate::error::RenderError;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Renders pages in a real browser behind a WebDriver server.
pub struct WebDriverRenderer {
    webdriver_url: String,
    headless: bool,
    timeout: Duration,
}

impl WebDriverRenderer {
    /// Creates a renderer from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            timeout: config.render_timeout(),
        }
    }

    /// Session capabilities for Chrome and Firefox drivers.
    fn capabilities(&self) -> Map<String, Value> {
        let mut chrome_args = vec!["--disable-gpu", "--no-sandbox", "--window-size=1920,1080"];
        let mut firefox_args = Vec::new();

        if self.headless {
            chrome_args.push("--headless=new");
            firefox_args.push("-headless");
        }

        let mut caps = Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
        caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
        caps
    }

    async fn connect(&self) -> Result<Client, RenderError> {
        debug!("Opening WebDriver session at {}", self.webdriver_url);

        ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| RenderError::Session(e.to_string()))
    }

    /// Navigates and waits until `<body>` is present.
    async fn load(&self, client: &Client, url: &str) -> Result<String, RenderError> {
        client.goto(url).await.map_err(|e| RenderError::navigation(url, e))?;

        client
            .wait()
            .at_most(self.timeout)
            .for_element(Locator::Css("body"))
            .await
            .map_err(|e| match e {
                CmdError::WaitTimeout => self.timeout_error(url),
                other => RenderError::navigation(url, other),
            })?;

        client.source().await.map_err(|e| RenderError::navigation(url, e))
    }

    fn timeout_error(&self, url: &str) -> RenderError {
        RenderError::Timeout { url: url.to_string(), secs: self.timeout.as_secs() }
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        info!("Rendering {}", url);

        let client = self.connect().await?;

        let result = match tokio::time::timeout(self.timeout, self.load(&client, url)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error(url)),
        };

        if let Err(e) = client.close().await {
            warn!("Failed to close WebDriver session: {}", e);
        }

        result
    }

    fn name(&self) -> &'static str {
        "webdriver"
    }
}
