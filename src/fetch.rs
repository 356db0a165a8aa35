//! Sequential per-store fetch loop.
//!
//! Stores are processed one at a time in target order. A render or
//! extraction failure is recorded against its store and the loop moves on;
//! a storage failure ends the batch.

use crate::compare;
use crate::error::{FetchError, StorageError};
use crate::extract::PriceExtractor;
use crate::models::{Recommendation, StoreQuote, StoreTarget};
use crate::render::PageRenderer;
use crate::store::PriceStore;
use tracing::{debug, info, warn};

/// Result of fetching one store.
#[derive(Debug)]
pub struct StoreOutcome {
    pub store_name: String,
    pub url: String,
    pub result: Result<StoreQuote, FetchError>,
}

impl StoreOutcome {
    /// Returns the quote if the store succeeded.
    pub fn quote(&self) -> Option<&StoreQuote> {
        self.result.as_ref().ok()
    }

    /// Returns the error if the store failed.
    pub fn error(&self) -> Option<&FetchError> {
        self.result.as_ref().err()
    }
}

/// All outcomes of one fetch for a product.
#[derive(Debug)]
pub struct FetchReport {
    pub product: String,
    pub outcomes: Vec<StoreOutcome>,
}

impl FetchReport {
    /// Successful quotes in target order.
    pub fn quotes(&self) -> Vec<&StoreQuote> {
        self.outcomes.iter().filter_map(StoreOutcome::quote).collect()
    }

    /// Failed stores with their errors.
    pub fn failures(&self) -> Vec<(&str, &FetchError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (o.store_name.as_str(), e)))
            .collect()
    }

    /// Cheapest store among the successful quotes.
    pub fn recommendation(&self) -> Option<Recommendation> {
        compare::recommend(self.quotes())
    }

    /// Returns true if no store produced a price.
    pub fn is_empty(&self) -> bool {
        self.quotes().is_empty()
    }
}

/// Fetches every requested target once and records successful prices.
///
/// Targets without a URL are skipped. Each store gets exactly one attempt.
pub async fn fetch_all(
    renderer: &dyn PageRenderer,
    extractor: &PriceExtractor,
    store: &impl PriceStore,
    product: &str,
    targets: &[StoreTarget],
) -> Result<Vec<StoreOutcome>, StorageError> {
    let mut outcomes = Vec::new();

    for target in targets.iter().filter(|t| t.is_requested()) {
        let url = target.url.trim();
        debug!("Fetching {} from {} via {}", product, target.name, renderer.name());

        let result = match fetch_one(renderer, extractor, url).await {
            Ok(price) => {
                store.upsert(product, &target.name, price)?;
                info!("{}: {}{}", target.name, extractor.symbol(), price);
                Ok(StoreQuote::new(&target.name, price))
            }
            Err(e) => {
                warn!("Error fetching price from {}: {}", target.name, e);
                Err(e)
            }
        };

        outcomes.push(StoreOutcome {
            store_name: target.name.clone(),
            url: url.to_string(),
            result,
        });
    }

    Ok(outcomes)
}

async fn fetch_one(
    renderer: &dyn PageRenderer,
    extractor: &PriceExtractor,
    url: &str,
) -> Result<rust_decimal::Decimal, FetchError> {
    let page = renderer.render(url).await?;
    Ok(extractor.extract(&page)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, RenderError};
    use crate::models::PriceObservation;
    use crate::store::SqliteStore;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages per URL; unknown URLs time out.
    struct MockRenderer {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl MockRenderer {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages.iter().map(|(u, p)| (u.to_string(), p.to_string())).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageRenderer for MockRenderer {
        async fn render(&self, url: &str) -> Result<String, RenderError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| RenderError::Timeout { url: url.to_string(), secs: 10 })
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl PriceStore for BrokenStore {
        fn upsert(&self, _: &str, _: &str, _: Decimal) -> Result<PriceObservation, StorageError> {
            Err(StorageError::Database(rusqlite::Error::InvalidQuery))
        }

        fn list_for_product(&self, _: &str) -> Result<Vec<PriceObservation>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn targets() -> Vec<StoreTarget> {
        vec![
            StoreTarget::new("A", "https://a.test/p"),
            StoreTarget::new("B", "https://b.test/p"),
            StoreTarget::new("C", "https://c.test/p"),
        ]
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let renderer = MockRenderer::new(&[
            ("https://a.test/p", "<b>₹120</b>"),
            ("https://c.test/p", "<b>₹90</b>"),
        ]);
        let store = SqliteStore::in_memory().unwrap();
        let extractor = PriceExtractor::default();

        let outcomes =
            fetch_all(&renderer, &extractor, &store, "Atta 5kg", &targets()).await.unwrap();
        let report = FetchReport { product: "Atta 5kg".to_string(), outcomes };

        let quotes = report.quotes();
        assert_eq!(quotes.len(), 2);
        assert_eq!(*quotes[0], StoreQuote::new("A", dec!(120)));
        assert_eq!(*quotes[1], StoreQuote::new("C", dec!(90)));

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "B");
        assert!(matches!(failures[0].1, FetchError::Render(RenderError::Timeout { .. })));

        let rec = report.recommendation().unwrap();
        assert_eq!(rec.store_name, "C");
        assert_eq!(rec.price, dec!(90));

        assert_eq!(store.list_for_product("Atta 5kg").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_extraction_failure_continues() {
        let renderer = MockRenderer::new(&[
            ("https://a.test/p", "Currently unavailable"),
            ("https://b.test/p", "₹75.50"),
            ("https://c.test/p", "₹80"),
        ]);
        let store = SqliteStore::in_memory().unwrap();

        let outcomes =
            fetch_all(&renderer, &PriceExtractor::default(), &store, "Oil", &targets())
                .await
                .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            outcomes[0].error(),
            Some(FetchError::Extraction(ExtractionError::NoPrice))
        ));
        assert_eq!(outcomes[1].quote().unwrap().price, dec!(75.50));
        assert_eq!(outcomes[2].quote().unwrap().price, dec!(80));
    }

    #[tokio::test]
    async fn test_targets_without_url_are_skipped() {
        let renderer = MockRenderer::new(&[("https://a.test/p", "₹10")]);
        let store = SqliteStore::in_memory().unwrap();
        let targets = vec![
            StoreTarget::new("A", "https://a.test/p"),
            StoreTarget::new("B", ""),
            StoreTarget::new("C", "  "),
        ];

        let outcomes =
            fetch_all(&renderer, &PriceExtractor::default(), &store, "Salt", &targets)
                .await
                .unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(renderer.calls(), vec!["https://a.test/p"]);
    }

    #[tokio::test]
    async fn test_one_attempt_per_store() {
        let renderer = MockRenderer::new(&[]);
        let store = SqliteStore::in_memory().unwrap();

        let outcomes =
            fetch_all(&renderer, &PriceExtractor::default(), &store, "Salt", &targets())
                .await
                .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| o.quote().is_none()));
        assert_eq!(renderer.calls().len(), 3);

        let report = FetchReport { product: "Salt".to_string(), outcomes };
        assert!(report.is_empty());
        assert!(report.recommendation().is_none());
    }

    #[tokio::test]
    async fn test_storage_error_aborts_batch() {
        let renderer = MockRenderer::new(&[
            ("https://a.test/p", "₹10"),
            ("https://b.test/p", "₹20"),
        ]);

        let result =
            fetch_all(&renderer, &PriceExtractor::default(), &BrokenStore, "Salt", &targets())
                .await;

        assert!(result.is_err());
        assert_eq!(renderer.calls(), vec!["https://a.test/p"]);
    }

    #[tokio::test]
    async fn test_refetch_supersedes_stored_price() {
        let store = SqliteStore::in_memory().unwrap();
        let extractor = PriceExtractor::default();
        let targets = vec![StoreTarget::new("A", "https://a.test/p")];

        let first = MockRenderer::new(&[("https://a.test/p", "₹100")]);
        fetch_all(&first, &extractor, &store, "Tea", &targets).await.unwrap();

        let second = MockRenderer::new(&[("https://a.test/p", "₹95")]);
        fetch_all(&second, &extractor, &store, "Tea", &targets).await.unwrap();

        let stored = store.list_for_product("Tea").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].price, dec!(95));
    }
}
