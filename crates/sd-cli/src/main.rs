use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sd_md::{MarketDataGateway, YahooGateway};
use sd_whatif::{compute_what_if, WhatIfRequest};
use tracing::info;

#[derive(Parser)]
#[command(name = "sd")]
#[command(about = "Stock dashboard operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Symbol catalog utilities
    Catalog {
        #[command(subcommand)]
        cmd: CatalogCmd,
    },

    /// Print the latest quote for a symbol as JSON
    Quote {
        symbol: String,
    },

    /// Hypothetical buy-and-hold return for a symbol
    Whatif {
        symbol: String,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the window, inclusive (YYYY-MM-DD). Omit for latest.
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Amount invested at the first close
        #[arg(long)]
        amount: f64,
    },
}

#[derive(Subcommand)]
enum CatalogCmd {
    /// Sort an exchange export (Symbol,Name) by symbol into a catalog CSV.
    Sort {
        #[arg(long, default_value = "all_us_stocks.csv")]
        input: PathBuf,

        #[arg(long, default_value = "all_stocks_sorted.csv")]
        output: PathBuf,
    },

    /// Load a catalog CSV and print it as JSON
    List {
        #[arg(long, default_value = "./assets/csv/all_stocks_sorted.csv")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Catalog { cmd } => match cmd {
            CatalogCmd::Sort { input, output } => {
                let n = sd_catalog::sort_catalog(&input, &output)
                    .with_context(|| format!("sort {}", input.display()))?;
                info!(entries = n, "catalog sorted");
                println!("Sorted CSV saved as {}", output.display());
            }

            CatalogCmd::List { path } => {
                let catalog = sd_catalog::load_catalog(&path)
                    .with_context(|| format!("load {}", path.display()))?;
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            }
        },

        Commands::Quote { symbol } => {
            let gw = gateway();
            let quote = gw
                .quote(symbol.trim())
                .await
                .with_context(|| format!("quote {symbol}"))?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }

        Commands::Whatif {
            symbol,
            start,
            end,
            amount,
        } => {
            let gw = gateway();
            let req = WhatIfRequest {
                symbol,
                start,
                end,
                amount,
            };
            let result = compute_what_if(&gw, &req)
                .await
                .with_context(|| format!("whatif {}", req.symbol))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn gateway() -> YahooGateway {
    let base = std::env::var("YAHOO_BASE_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| sd_md::yahoo::DEFAULT_BASE_URL.to_string());
    YahooGateway::new_with_base_url(base)
}
