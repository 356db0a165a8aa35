//! Fetch command: render every store page, save prices, recommend the cheapest.

use super::validate_product;
use crate::config::Config;
use crate::fetch::{fetch_all, FetchReport};
use crate::format::Formatter;
use crate::models::StoreTarget;
use crate::render::{self, PageRenderer};
use crate::store::{PriceStore, SqliteStore};
use anyhow::{Context, Result};
use tracing::info;

/// Fetches current prices for a product from the configured stores.
pub struct FetchCommand {
    config: Config,
}

impl FetchCommand {
    /// Creates a new fetch command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches prices and returns formatted output.
    pub async fn execute(&self, product: &str) -> Result<String> {
        // Reject bad input before a browser session or database file exists
        validate_product(product)?;
        self.requested_targets()?;

        let renderer =
            render::from_config(&self.config).context("Failed to create page renderer")?;
        let store = SqliteStore::open(&self.config.db_path).with_context(|| {
            format!("Failed to open price database: {}", self.config.db_path.display())
        })?;

        self.execute_with(renderer.as_ref(), &store, product).await
    }

    /// Fetches prices with a provided renderer and store (for testing).
    pub async fn execute_with(
        &self,
        renderer: &dyn PageRenderer,
        store: &impl PriceStore,
        product: &str,
    ) -> Result<String> {
        let product = validate_product(product)?;

        let targets = self.requested_targets()?;
        let extractor = self.config.extractor()?;

        info!("Fetching {} from {} stores", product, targets.len());

        let outcomes = fetch_all(renderer, &extractor, store, product, &targets)
            .await
            .context("Failed to save fetched price")?;

        let report = FetchReport { product: product.to_string(), outcomes };
        info!("Fetched {} of {} prices", report.quotes().len(), targets.len());

        let formatter = Formatter::new(self.config.format, &self.config.currency_symbol);
        Ok(formatter.format_fetch(&report))
    }

    fn requested_targets(&self) -> Result<Vec<StoreTarget>> {
        let targets: Vec<StoreTarget> =
            self.config.stores.iter().filter(|t| t.is_requested()).cloned().collect();
        if targets.is_empty() {
            anyhow::bail!(
                "No store URLs given. Use --store NAME=URL or set `url` for a store in the config file."
            );
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::error::RenderError;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Returns the same page for every URL.
    struct MockRenderer {
        page: Option<String>,
    }

    #[async_trait]
    impl PageRenderer for MockRenderer {
        async fn render(&self, url: &str) -> Result<String, RenderError> {
            self.page.clone().ok_or_else(|| RenderError::navigation(url, "connection refused"))
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn make_test_config() -> Config {
        let mut config = Config::default();
        config.merge_targets(vec![
            StoreTarget::new("Dmart", "https://dmart.test/atta"),
            StoreTarget::new("Jiomart", "https://jiomart.test/atta"),
        ]);
        config
    }

    #[tokio::test]
    async fn test_fetch_command_basic() {
        let renderer = MockRenderer { page: Some("<span>₹239</span>".to_string()) };
        let store = SqliteStore::in_memory().unwrap();
        let cmd = FetchCommand::new(make_test_config());

        let output = cmd.execute_with(&renderer, &store, " Atta 5kg ").await.unwrap();
        assert!(output.contains("Prices for Atta 5kg:"));
        assert!(output.contains("Dmart"));
        assert!(output.contains("Best price: ₹239 at Dmart"));

        assert_eq!(store.list_for_product("Atta 5kg").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_command_empty_product() {
        let renderer = MockRenderer { page: None };
        let store = SqliteStore::in_memory().unwrap();
        let cmd = FetchCommand::new(make_test_config());

        let err = cmd.execute_with(&renderer, &store, "  ").await.unwrap_err();
        assert!(err.to_string().contains("Please enter a product name"));
    }

    #[tokio::test]
    async fn test_fetch_command_no_urls() {
        let renderer = MockRenderer { page: None };
        let store = SqliteStore::in_memory().unwrap();
        let cmd = FetchCommand::new(Config::default());

        let err = cmd.execute_with(&renderer, &store, "Atta").await.unwrap_err();
        assert!(err.to_string().contains("No store URLs given"));
    }

    #[tokio::test]
    async fn test_fetch_command_all_failed_is_not_an_error() {
        let renderer = MockRenderer { page: None };
        let store = SqliteStore::in_memory().unwrap();
        let cmd = FetchCommand::new(make_test_config());

        let output = cmd.execute_with(&renderer, &store, "Atta").await.unwrap();
        assert!(output.contains("No prices were fetched."));
        assert!(output.contains("Error fetching price from Dmart"));
        assert!(output.contains("Error fetching price from Jiomart"));
    }

    #[tokio::test]
    async fn test_fetch_command_json_format() {
        let renderer = MockRenderer { page: Some("₹99".to_string()) };
        let store = SqliteStore::in_memory().unwrap();
        let mut config = make_test_config();
        config.format = OutputFormat::Json;

        let output =
            FetchCommand::new(config).execute_with(&renderer, &store, "Atta").await.unwrap();
        assert!(output.starts_with('{'));
        assert!(output.contains("\"quotes\""));
    }

    #[tokio::test]
    async fn test_fetch_command_custom_currency() {
        let renderer = MockRenderer { page: Some("was ₹500, now $6.99".to_string()) };
        let store = SqliteStore::in_memory().unwrap();
        let mut config = make_test_config();
        config.currency_symbol = "$".to_string();

        let output =
            FetchCommand::new(config).execute_with(&renderer, &store, "Atta").await.unwrap();
        assert!(output.contains("$6.99"));
    }

    #[tokio::test]
    async fn test_execute_rejects_input_before_opening_database() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("prices.db");

        let mut config = make_test_config();
        config.db_path = db_path.clone();
        let err = FetchCommand::new(config).execute("  ").await.unwrap_err();
        assert!(err.to_string().contains("Please enter a product name"));
        assert!(!db_path.exists());

        let config = Config { db_path: db_path.clone(), ..Config::default() };
        let err = FetchCommand::new(config).execute("Atta").await.unwrap_err();
        assert!(err.to_string().contains("No store URLs given"));
        assert!(!db_path.exists());
    }
}
