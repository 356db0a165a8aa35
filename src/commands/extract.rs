//! Extract command: run the price extractor over a saved page.

use crate::config::{Config, OutputFormat};
use anyhow::{Context, Result};
use serde_json::json;
use std::io::Read;
use std::path::Path;

/// Shows every price candidate in a page and the one that would be stored.
pub struct ExtractCommand {
    config: Config,
}

impl ExtractCommand {
    /// Creates a new extract command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Reads the page from `path` (`-` for stdin) and reports the extraction.
    pub fn execute(&self, path: &Path) -> Result<String> {
        let page = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("Failed to read page from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read page: {}", path.display()))?
        };

        self.execute_on(&page)
    }

    /// Reports the extraction for page text already in memory.
    pub fn execute_on(&self, page: &str) -> Result<String> {
        let extractor = self.config.extractor()?;
        let candidates = extractor.candidates(page);
        let selected = extractor.extract(page);

        if self.config.format == OutputFormat::Json {
            let value = json!({
                "scan": extractor.scan(),
                "candidates": candidates,
                "price": selected.as_ref().ok(),
                "error": selected.as_ref().err().map(|e| e.to_string()),
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut lines = Vec::new();
        lines.push(format!("Scan mode: {}", extractor.scan()));
        lines.push(format!("Candidates ({}):", candidates.len()));
        for (i, candidate) in candidates.iter().enumerate() {
            lines.push(format!("  {:>3}. {}", i + 1, candidate));
        }

        lines.push(String::new());
        match selected {
            Ok(price) => lines.push(format!("Selected price: {}{}", extractor.symbol(), price)),
            Err(e) => lines.push(format!("No price: {}", e)),
        }

        Ok(lines.join("\n"))
    }
}
