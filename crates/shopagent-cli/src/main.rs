mod catalog;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopagent-cli")]
#[command(about = "Catalog tools for the shopping agent")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the Shopify catalog once and write the products file
    Sync,
    /// Download a storefront catalog over its MCP endpoint
    Scrape {
        /// Store domain (e.g., skims.com)
        #[arg(long)]
        store: String,
        /// Maximum products to download (0 = unlimited)
        #[arg(long, default_value_t = 300)]
        max_products: usize,
        /// Output file (defaults to <store_slug>_catalog.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Match a query against the cached catalog files
    Match {
        /// Free-text query; words are joined with spaces
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = shopagent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Sync) => catalog::run_sync(&config).await,
        Some(Commands::Scrape {
            store,
            max_products,
            output,
        }) => catalog::run_scrape(&config, &store, max_products, output).await,
        Some(Commands::Match { query }) => catalog::run_match(&config, &query.join(" ")).await,
        None => {
            println!("shopagent-cli: use --help to list commands");
            Ok(())
        }
    }
}
