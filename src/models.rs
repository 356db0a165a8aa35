//! Data models for store targets, quotes, and stored observations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Anything that pairs a store with a price.
pub trait Priced {
    /// Name of the store offering the price.
    fn store_name(&self) -> &str;

    /// The offered price.
    fn price(&self) -> Decimal;
}

/// A storefront to fetch, identified by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreTarget {
    /// Store display name (e.g. "Dmart")
    pub name: String,
    /// Product page URL; empty means the store is skipped
    #[serde(default)]
    pub url: String,
}

impl StoreTarget {
    /// Creates a new target.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self { name: name.into(), url: url.into() }
    }

    /// Returns true if this target has a URL to fetch.
    pub fn is_requested(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl std::str::FromStr for StoreTarget {
    type Err = String;

    /// Parses `NAME=URL`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) =
            s.split_once('=').ok_or_else(|| format!("Expected NAME=URL, got: {}", s))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Missing store name in: {}", s));
        }

        Ok(Self::new(name, url.trim()))
    }
}

/// A price observed for one store during the current fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreQuote {
    pub store_name: String,
    pub price: Decimal,
}

impl StoreQuote {
    /// Creates a new quote.
    pub fn new(store_name: impl Into<String>, price: Decimal) -> Self {
        Self { store_name: store_name.into(), price }
    }
}

impl Priced for StoreQuote {
    fn store_name(&self) -> &str {
        &self.store_name
    }

    fn price(&self) -> Decimal {
        self.price
    }
}

/// The latest stored price for a (product, store) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub product_name: String,
    pub store_name: String,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl Priced for PriceObservation {
    fn store_name(&self) -> &str {
        &self.store_name
    }

    fn price(&self) -> Decimal {
        self.price
    }
}

/// Cheapest store among a set of prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Store with the lowest price (first one on ties)
    pub store_name: String,
    /// Lowest price
    pub price: Decimal,
    /// Number of prices compared
    pub stores_compared: usize,
    /// Difference between the highest and lowest price
    pub max_savings: Decimal,
}

impl Recommendation {
    /// Savings as a percentage of the highest price, if meaningful.
    pub fn max_savings_percent(&self) -> Option<Decimal> {
        let highest = self.price + self.max_savings;
        if highest.is_zero() || self.max_savings.is_zero() {
            return None;
        }
        Some((self.max_savings / highest * Decimal::ONE_HUNDRED).round_dp(0))
    }
}
