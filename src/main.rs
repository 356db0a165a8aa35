//! pricewise - fetch product prices across storefronts and recommend the cheapest

use anyhow::Result;
use clap::{Parser, Subcommand};
use pricewise::commands::{ExtractCommand, FetchCommand, HistoryCommand};
use pricewise::config::{Config, OutputFormat};
use pricewise::extract::ScanMode;
use pricewise::models::StoreTarget;
use pricewise::render::RendererKind;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pricewise",
    version,
    about = "Fetch product prices across storefronts and recommend the cheapest",
    long_about = "Renders each store's product page, takes the first currency-prefixed price on it, \
                  keeps the latest price per store in SQLite, and points out the cheapest store."
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "PRICEWISE_DB")]
    db: Option<PathBuf>,

    /// Page renderer (webdriver, http)
    #[arg(long, global = true)]
    renderer: Option<RendererKind>,

    /// WebDriver endpoint
    #[arg(long, global = true, env = "PRICEWISE_WEBDRIVER")]
    webdriver: Option<String>,

    /// Seconds to wait for each page
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// Currency symbol that prefixes prices
    #[arg(long, global = true)]
    currency: Option<String>,

    /// Scan raw markup or visible text only
    #[arg(long, global = true)]
    scan: Option<ScanMode>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch current prices and save them
    #[command(alias = "f")]
    Fetch {
        /// Product name
        product: String,

        /// Store page as NAME=URL (repeatable)
        #[arg(short, long = "store", value_name = "NAME=URL")]
        stores: Vec<StoreTarget>,
    },

    /// Show stored prices for a product
    #[command(alias = "h")]
    History {
        /// Product name
        product: String,
    },

    /// Run the price extractor over a saved page
    Extract {
        /// HTML file, or - for stdin
        file: PathBuf,
    },

    /// List configured stores
    Stores,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(renderer) = cli.renderer {
        config.renderer = renderer;
    }
    if let Some(url) = cli.webdriver {
        config.webdriver_url = url;
    }
    if let Some(secs) = cli.timeout {
        config.render_timeout_secs = secs;
    }
    if cli.headed {
        config.headless = false;
    }
    if let Some(symbol) = cli.currency {
        config.currency_symbol = symbol;
    }
    if let Some(scan) = cli.scan {
        config.scan = scan;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }

    match cli.command {
        Commands::Fetch { product, stores } => {
            config.merge_targets(stores);

            let cmd = FetchCommand::new(config);
            let output = cmd.execute(&product).await?;
            println!("{}", output);
        }

        Commands::History { product } => {
            let cmd = HistoryCommand::new(config);
            let output = cmd.execute(&product)?;
            println!("{}", output);
        }

        Commands::Extract { file } => {
            let cmd = ExtractCommand::new(config);
            let output = cmd.execute(&file)?;
            println!("{}", output);
        }

        Commands::Stores => {
            println!("Configured stores:\n");
            println!("{:<16} {}", "Store", "URL");
            println!("{:-<16} {:-<40}", "", "");

            for store in &config.stores {
                let url = if store.is_requested() { store.url.as_str() } else { "(not set)" };
                println!("{:<16} {}", store.name, url);
            }
        }
    }

    Ok(())
}
