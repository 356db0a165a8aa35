//! Table creation for the price store.

use rusqlite::{Connection, Result};

/// Create the price table and its lookup index if missing.
pub fn create_tables(conn: &Connection) -> Result<()> {
    // One live row per (product_name, store_name); superseded rows are deleted
    conn.execute(
        "CREATE TABLE IF NOT EXISTS product_prices (
            product_name TEXT NOT NULL,
            store_name TEXT NOT NULL,
            price TEXT NOT NULL,
            last_updated INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_prices_product_store
            ON product_prices(product_name, store_name)",
        [],
    )?;

    Ok(())
}
