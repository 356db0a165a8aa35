//! Price extraction from rendered page text.
//!
//! A page is scanned for currency-prefixed amounts (`₹ 1,299.50`) and the
//! first match in document order becomes the canonical price. Promotional or
//! struck-through prices that appear earlier in the page win over the real
//! one; this is the current selection rule, not an accident.

pub mod text;

use crate::error::ExtractionError;
use regex_lite::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY: &str = "₹";

/// One optional space between symbol and amount. regex-lite's `\s` is
/// ASCII only, so no-break and thin spaces are listed explicitly.
const SEPARATOR: &str = "[\\s\u{a0}\u{2009}\u{202f}]?";

static DEFAULT_EXTRACTOR: LazyLock<PriceExtractor> = LazyLock::new(|| {
    PriceExtractor::new(DEFAULT_CURRENCY, ScanMode::Markup).expect("default price pattern")
});

/// Extracts the first rupee-prefixed price from raw page markup.
pub fn extract_price(page_text: &str) -> Result<Decimal, ExtractionError> {
    DEFAULT_EXTRACTOR.extract(page_text)
}

/// Which part of the page is scanned for prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Raw page source, attributes and scripts included
    #[default]
    Markup,
    /// Visible body text only
    Text,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markup" | "html" => Ok(ScanMode::Markup),
            "text" => Ok(ScanMode::Text),
            _ => Err(format!("Unknown scan mode: {}. Use: markup, text", s)),
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Markup => write!(f, "markup"),
            ScanMode::Text => write!(f, "text"),
        }
    }
}

/// Finds and parses currency-prefixed prices.
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    symbol: String,
    pattern: Regex,
    scan: ScanMode,
}

impl PriceExtractor {
    /// Creates an extractor for the given currency symbol.
    pub fn new(symbol: &str, scan: ScanMode) -> Result<Self, regex_lite::Error> {
        // symbol, optional space, digits with comma groups, up to two decimals
        let pattern = Regex::new(&format!(
            r"{}{}[\d,]+(?:\.\d{{1,2}})?",
            regex_lite::escape(symbol),
            SEPARATOR
        ))?;

        Ok(Self { symbol: symbol.to_string(), pattern, scan })
    }

    /// Returns the currency symbol this extractor matches.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the scan mode.
    pub fn scan(&self) -> ScanMode {
        self.scan
    }

    /// Returns every price-shaped substring in document order.
    pub fn candidates(&self, page_text: &str) -> Vec<String> {
        let scanned = self.prepare(page_text);
        self.pattern.find_iter(&scanned).map(|m| m.as_str().to_string()).collect()
    }

    /// Returns the value of the first price-shaped substring.
    pub fn extract(&self, page_text: &str) -> Result<Decimal, ExtractionError> {
        let candidates = self.candidates(page_text);
        debug!("Detected price patterns: {:?}", candidates);

        let first = candidates.first().ok_or(ExtractionError::NoPrice)?;
        self.parse_match(first)
    }

    /// Strips symbol and thousands separators, then parses.
    fn parse_match(&self, raw: &str) -> Result<Decimal, ExtractionError> {
        let cleaned = raw.replace(self.symbol.as_str(), "").replace(',', "");
        let cleaned = cleaned.trim();
        trace!("Cleaned price text: '{}'", cleaned);

        Decimal::from_str(cleaned)
            .map_err(|_| ExtractionError::Unparseable { raw: raw.to_string() })
    }

    fn prepare<'a>(&self, page_text: &'a str) -> std::borrow::Cow<'a, str> {
        match self.scan {
            ScanMode::Markup => std::borrow::Cow::Borrowed(page_text),
            ScanMode::Text => std::borrow::Cow::Owned(text::visible_text(page_text)),
        }
    }
}

impl Default for PriceExtractor {
    fn default() -> Self {
        DEFAULT_EXTRACTOR.clone()
    }
}
