//! Output formatting for fetch results and price history (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::fetch::FetchReport;
use crate::models::{PriceObservation, Recommendation};
use rust_decimal::Decimal;
use serde_json::json;

/// Formats price reports for output.
pub struct Formatter {
    format: OutputFormat,
    currency: String,
}

impl Formatter {
    /// Creates a new formatter that prefixes prices with `currency`.
    pub fn new(format: OutputFormat, currency: impl Into<String>) -> Self {
        Self { format, currency: currency.into() }
    }

    /// Formats the outcome of a fetch.
    pub fn format_fetch(&self, report: &FetchReport) -> String {
        match self.format {
            OutputFormat::Json => self.json_fetch(report),
            OutputFormat::Table => self.table_fetch(report),
            OutputFormat::Markdown => self.markdown_fetch(report),
            OutputFormat::Csv => self.csv_fetch(report),
        }
    }

    /// Formats stored observations for a product, newest first.
    pub fn format_history(
        &self,
        product: &str,
        observations: &[PriceObservation],
        recommendation: Option<&Recommendation>,
    ) -> String {
        match self.format {
            OutputFormat::Json => self.json_history(product, observations, recommendation),
            OutputFormat::Table => self.table_history(product, observations, recommendation),
            OutputFormat::Markdown => self.markdown_history(product, observations, recommendation),
            OutputFormat::Csv => self.csv_history(observations),
        }
    }

    fn money(&self, price: Decimal) -> String {
        format!("{}{}", self.currency, price)
    }

    fn savings_note(&self, rec: &Recommendation) -> Option<String> {
        let pct = rec.max_savings_percent()?;
        Some(format!("saves {} ({}%) vs. the most expensive store", self.money(rec.max_savings), pct))
    }

    fn recommendation_line(&self, rec: &Recommendation) -> String {
        let mut line = format!("🏆 Best price: {} at {}", self.money(rec.price), rec.store_name);
        if let Some(note) = self.savings_note(rec) {
            line.push_str(&format!(" ({})", note));
        }
        line
    }

    // JSON formatting

    fn json_fetch(&self, report: &FetchReport) -> String {
        let failures: Vec<_> = report
            .outcomes
            .iter()
            .filter_map(|o| {
                o.error().map(|e| {
                    json!({ "store_name": o.store_name, "url": o.url, "error": e.to_string() })
                })
            })
            .collect();

        let value = json!({
            "product": report.product,
            "quotes": report.quotes(),
            "failures": failures,
            "recommendation": report.recommendation(),
        });

        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    fn json_history(
        &self,
        product: &str,
        observations: &[PriceObservation],
        recommendation: Option<&Recommendation>,
    ) -> String {
        let value = json!({
            "product": product,
            "observations": observations,
            "recommendation": recommendation,
        });

        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    // Table formatting

    fn table_fetch(&self, report: &FetchReport) -> String {
        let mut lines = Vec::new();
        let quotes = report.quotes();

        if quotes.is_empty() {
            lines.push("No prices were fetched.".to_string());
        } else {
            let width = Self::store_width(quotes.iter().map(|q| q.store_name.as_str()));

            lines.push(format!("Prices for {}:", report.product));
            lines.push(String::new());
            lines.push(format!("{:<width$}  {:>12}", "Store", "Price"));
            lines.push(format!("{:-<width$}  {:->12}", "", ""));
            for quote in &quotes {
                lines.push(format!("{:<width$}  {:>12}", quote.store_name, self.money(quote.price)));
            }
        }

        let failures = report.failures();
        if !failures.is_empty() {
            lines.push(String::new());
            for (store, err) in failures {
                lines.push(format!("⚠️  Error fetching price from {}: {}", store, err));
            }
        }

        if let Some(rec) = report.recommendation() {
            lines.push(String::new());
            lines.push(self.recommendation_line(&rec));
        }

        lines.join("\n")
    }

    fn table_history(
        &self,
        product: &str,
        observations: &[PriceObservation],
        recommendation: Option<&Recommendation>,
    ) -> String {
        if observations.is_empty() {
            return format!("No prices found for {}.", product);
        }

        let width = Self::store_width(observations.iter().map(|o| o.store_name.as_str()));
        let mut lines = Vec::new();

        lines.push(format!("Prices for {}:", product));
        lines.push(String::new());
        lines.push(format!("{:<width$}  {:>12}  {}", "Store", "Price", "Last Updated"));
        lines.push(format!("{:-<width$}  {:->12}  {:-<19}", "", "", ""));

        for obs in observations {
            lines.push(format!(
                "{:<width$}  {:>12}  {}",
                obs.store_name,
                self.money(obs.price),
                obs.observed_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        if let Some(rec) = recommendation {
            lines.push(String::new());
            lines.push(self.recommendation_line(rec));
        }

        lines.join("\n")
    }

    fn store_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
        names.map(|n| n.chars().count()).max().unwrap_or(0).max("Store".len())
    }

    // Markdown formatting

    fn markdown_fetch(&self, report: &FetchReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("## {}", report.product));
        lines.push(String::new());

        let quotes = report.quotes();
        if quotes.is_empty() {
            lines.push("No prices were fetched.".to_string());
        } else {
            lines.push("| Store | Price |".to_string());
            lines.push("|-------|------:|".to_string());
            for quote in &quotes {
                lines.push(format!("| {} | {} |", quote.store_name, self.money(quote.price)));
            }
        }

        let failures = report.failures();
        if !failures.is_empty() {
            lines.push(String::new());
            for (store, err) in failures {
                lines.push(format!("- ⚠️ **{}**: {}", store, err));
            }
        }

        if let Some(rec) = report.recommendation() {
            lines.push(String::new());
            lines.push(self.markdown_recommendation(&rec));
        }

        lines.join("\n")
    }

    fn markdown_history(
        &self,
        product: &str,
        observations: &[PriceObservation],
        recommendation: Option<&Recommendation>,
    ) -> String {
        if observations.is_empty() {
            return format!("No prices found for {}.", product);
        }

        let mut lines = Vec::new();
        lines.push(format!("## {}", product));
        lines.push(String::new());
        lines.push("| Store | Price | Last Updated |".to_string());
        lines.push("|-------|------:|--------------|".to_string());

        for obs in observations {
            lines.push(format!(
                "| {} | {} | {} |",
                obs.store_name,
                self.money(obs.price),
                obs.observed_at.format("%Y-%m-%d %H:%M:%S")
            ));
        }

        if let Some(rec) = recommendation {
            lines.push(String::new());
            lines.push(self.markdown_recommendation(rec));
        }

        lines.join("\n")
    }

    fn markdown_recommendation(&self, rec: &Recommendation) -> String {
        let mut line =
            format!("> **Best price:** {} at **{}**", self.money(rec.price), rec.store_name);
        if let Some(note) = self.savings_note(rec) {
            line.push_str(&format!(" ({})", note));
        }
        line
    }

    // CSV formatting

    fn csv_fetch(&self, report: &FetchReport) -> String {
        let mut lines = vec!["store,url,price,error".to_string()];

        for outcome in &report.outcomes {
            let (price, error) = match &outcome.result {
                Ok(quote) => (quote.price.to_string(), String::new()),
                Err(e) => (String::new(), Self::csv_escape(&e.to_string())),
            };

            lines.push(format!(
                "{},{},{},{}",
                Self::csv_escape(&outcome.store_name),
                Self::csv_escape(&outcome.url),
                price,
                error
            ));
        }

        lines.join("\n")
    }

    fn csv_history(&self, observations: &[PriceObservation]) -> String {
        let mut lines = vec!["product,store,price,last_updated".to_string()];

        for obs in observations {
            lines.push(format!(
                "{},{},{},{}",
                Self::csv_escape(&obs.product_name),
                Self::csv_escape(&obs.store_name),
                obs.price,
                obs.observed_at.to_rfc3339()
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
