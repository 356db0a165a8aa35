//! pricewise - fetch product prices across storefronts and recommend the cheapest
//!
//! Product pages are rendered through WebDriver (or plain HTTP), the first
//! currency-prefixed amount on the page is taken as the price, and the latest
//! price per (product, store) is kept in SQLite.

pub mod commands;
pub mod compare;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod models;
pub mod render;
pub mod store;

pub use compare::{cheapest, recommend};
pub use config::Config;
pub use error::{ExtractionError, FetchError, RenderError, StorageError};
pub use extract::{extract_price, PriceExtractor};
pub use fetch::{fetch_all, FetchReport, StoreOutcome};
pub use models::{PriceObservation, Recommendation, StoreQuote, StoreTarget};
pub use store::{PriceStore, SqliteStore};
