//! CLI command implementations.

pub mod extract;
pub mod fetch;
pub mod history;

pub use extract::ExtractCommand;
pub use fetch::FetchCommand;
pub use history::HistoryCommand;

use anyhow::Result;

/// Trims the product name and rejects empty input.
pub(crate) fn validate_product(product: &str) -> Result<&str> {
    let product = product.trim();
    if product.is_empty() {
        anyhow::bail!("Please enter a product name.");
    }
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product() {
        assert_eq!(validate_product("  Atta 5kg ").unwrap(), "Atta 5kg");
        assert!(validate_product("").is_err());
        assert!(validate_product("   ").unwrap_err().to_string().contains("product name"));
    }
}
