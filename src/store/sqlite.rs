//! SQLite-backed price store.

use super::schema::create_tables;
use super::PriceStore;
use crate::error::StorageError;
use crate::models::PriceObservation;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Price store over a single SQLite connection.
///
/// Opened per command and passed explicitly to whoever needs it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        create_tables(&conn)?;

        info!("Price database ready at {}", path.display());
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    fn decode_row(
        product: String,
        store: String,
        price: String,
        micros: i64,
    ) -> Result<PriceObservation, StorageError> {
        let corrupt = |reason: String| StorageError::CorruptRow {
            product: product.clone(),
            store: store.clone(),
            reason,
        };

        let price = Decimal::from_str(&price)
            .map_err(|e| corrupt(format!("bad price '{}': {}", price, e)))?;
        let observed_at = DateTime::<Utc>::from_timestamp_micros(micros)
            .ok_or_else(|| corrupt(format!("bad timestamp {}", micros)))?;

        Ok(PriceObservation { product_name: product, store_name: store, price, observed_at })
    }
}

impl PriceStore for SqliteStore {
    fn upsert(
        &self,
        product: &str,
        store: &str,
        price: Decimal,
    ) -> Result<PriceObservation, StorageError> {
        let observed_at = Utc::now();

        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM product_prices WHERE product_name = ?1 AND store_name = ?2",
            params![product, store],
        )?;
        tx.execute(
            "INSERT INTO product_prices (product_name, store_name, price, last_updated)
             VALUES (?1, ?2, ?3, ?4)",
            params![product, store, price.to_string(), observed_at.timestamp_micros()],
        )?;
        tx.commit()?;

        debug!("Stored {} @ {} = {} (superseded {})", product, store, price, removed);

        Ok(PriceObservation {
            product_name: product.to_string(),
            store_name: store.to_string(),
            price,
            observed_at,
        })
    }

    fn list_for_product(&self, product: &str) -> Result<Vec<PriceObservation>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT product_name, store_name, price, last_updated
             FROM product_prices
             WHERE product_name = ?1
             ORDER BY last_updated DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![product], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;

        let mut observations = Vec::new();
        for row in rows {
            let (product, store, price, micros) = row?;
            observations.push(Self::decode_row(product, store, price, micros)?);
        }

        debug!("Loaded {} observations for {}", observations.len(), product);
        Ok(observations)
    }
}
