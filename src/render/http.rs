//! Plain HTTP renderer using wreq for TLS fingerprint emulation.
//!
//! No scripts run, so this only works for storefronts that ship the price in
//! the initial HTML.

use super::PageRenderer;
use crate::config::Config;
use crate::error::RenderError;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Fetches pages over HTTP while presenting as desktop Chrome.
pub struct HttpRenderer {
    client: Client,
    timeout: Duration,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl HttpRenderer {
    /// Creates a renderer from the configuration.
    pub fn new(config: &Config) -> Result<Self, RenderError> {
        let timeout = config.render_timeout();

        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(timeout)
            .connect_timeout(timeout);

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url)
                .map_err(|e| RenderError::Session(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| RenderError::Session(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Sleeps before a request when a delay is configured.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    fn map_error(&self, url: &str, err: wreq::Error) -> RenderError {
        if err.is_timeout() {
            RenderError::Timeout { url: url.to_string(), secs: self.timeout.as_secs() }
        } else {
            RenderError::navigation(url, err)
        }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        self.delay().await;

        info!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", "en-IN,en;q=0.9")
            .header("Cache-Control", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 || status == 503 {
            warn!("{} is throttling requests ({}). Consider a proxy or a longer delay.", url, status);
        }

        if !status.is_success() {
            return Err(RenderError::navigation(url, format!("status {}", status)));
        }

        response.text().await.map_err(|e| self.map_error(url, e))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config() -> Config {
        Config { render_timeout_secs: 1, delay_ms: 0, delay_jitter_ms: 0, ..Config::default() }
    }

    #[tokio::test]
    async fn test_render_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/product/atta"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><span>₹239</span></body></html>"),
            )
            .mount(&mock_server)
            .await;

        let renderer = HttpRenderer::new(&make_test_config()).unwrap();
        let body = renderer.render(&format!("{}/product/atta", mock_server.uri())).await.unwrap();
        assert!(body.contains("₹239"));
    }

    #[tokio::test]
    async fn test_render_404_is_navigation_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let renderer = HttpRenderer::new(&make_test_config()).unwrap();
        let err = renderer.render(&format!("{}/missing", mock_server.uri())).await.unwrap_err();
        assert!(matches!(err, RenderError::Navigation { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_render_503_is_navigation_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let renderer = HttpRenderer::new(&make_test_config()).unwrap();
        let err = renderer.render(&mock_server.uri()).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_render_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let renderer = HttpRenderer::new(&make_test_config()).unwrap();
        let err = renderer.render(&mock_server.uri()).await.unwrap_err();
        assert!(matches!(err, RenderError::Timeout { secs: 1, .. }));
    }
}
