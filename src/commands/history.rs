//! History command: show stored prices for a product.

use super::validate_product;
use crate::compare;
use crate::config::Config;
use crate::format::Formatter;
use crate::store::{PriceStore, SqliteStore};
use anyhow::{Context, Result};
use tracing::info;

/// Reads back the latest stored price per store.
pub struct HistoryCommand {
    config: Config,
}

impl HistoryCommand {
    /// Creates a new history command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loads stored prices and returns formatted output.
    pub fn execute(&self, product: &str) -> Result<String> {
        let store = SqliteStore::open(&self.config.db_path).with_context(|| {
            format!("Failed to open price database: {}", self.config.db_path.display())
        })?;

        self.execute_with_store(&store, product)
    }

    /// Loads stored prices from a provided store (for testing).
    pub fn execute_with_store(&self, store: &impl PriceStore, product: &str) -> Result<String> {
        let product = validate_product(product)?;

        let observations = store
            .list_for_product(product)
            .with_context(|| format!("Failed to load prices for {}", product))?;

        info!("Found {} stored prices for {}", observations.len(), product);

        let recommendation = compare::recommend(&observations);
        let formatter = Formatter::new(self.config.format, &self.config.currency_symbol);
        Ok(formatter.format_history(product, &observations, recommendation.as_ref()))
    }
}
