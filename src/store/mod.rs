//! Persistence of the latest observed price per (product, store).

pub mod schema;
pub mod sqlite;

use crate::error::StorageError;
use crate::models::PriceObservation;
use rust_decimal::Decimal;

pub use sqlite::SqliteStore;

/// Storage contract for price observations.
///
/// Every call commits on its own. A batch of upserts that fails midway
/// leaves the earlier stores updated.
pub trait PriceStore {
    /// Replaces any observation for (product, store) with a new one stamped now.
    fn upsert(
        &self,
        product: &str,
        store: &str,
        price: Decimal,
    ) -> Result<PriceObservation, StorageError>;

    /// Returns the observations for a product, newest first.
    fn list_for_product(&self, product: &str) -> Result<Vec<PriceObservation>, StorageError>;
}
