//! Costos CLI - review and update Odoo product costs.
//!
//! # Usage
//!
//! ```bash
//! # Check credentials
//! costos check
//!
//! # Browse the catalog
//! costos stats
//! costos categories --search aceite --with-counts
//! costos products --category 7 --limit 50
//! costos count products --category 7
//!
//! # Inspect a category before changing it
//! costos analyze 7
//!
//! # Change costs
//! costos set-cost 101 55.50
//! costos apply changes.json --dry-run
//! ```
//!
//! # Environment Variables
//!
//! - `ODOO_URL`, `ODOO_DB`, `ODOO_USER`, `ODOO_API_KEY` - Odoo connection (required)
//! - `ODOO_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `RUST_LOG` - Log filter (default: `costos_cli=info,costos_odoo=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use costos_core::Cost;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "costos")]
#[command(author, version, about = "Review and update Odoo product costs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the Odoo connection and credentials
    Check,
    /// Show product counts and the cheapest and dearest products
    Stats,
    /// List product categories
    Categories {
        /// Maximum number of categories
        #[arg(short, long, default_value_t = 50)]
        limit: u32,

        /// Number of categories to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,

        /// Company whose view of the data is used
        #[arg(long)]
        company: Option<i64>,

        /// Include the number of active stockable products per category
        #[arg(long)]
        with_counts: bool,

        /// Only categories that have products (implies --with-counts)
        #[arg(long)]
        with_products: bool,
    },
    /// List active stockable products
    Products {
        /// Maximum number of products
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Number of products to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<i64>,

        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,

        /// Company whose costs are read
        #[arg(long)]
        company: Option<i64>,
    },
    /// Count categories or products
    Count {
        #[command(subcommand)]
        target: CountTarget,
    },
    /// Set the cost of one product
    SetCost {
        /// Product template ID
        product: i64,

        /// New cost (greater than 0, at most 999999.99)
        cost: Cost,

        /// Revalue through accounting for this company instead of a plain write
        #[arg(long)]
        company: Option<i64>,
    },
    /// Analyze the current costs of a category
    Analyze {
        /// Category ID
        category: i64,

        /// Maximum number of products to inspect
        #[arg(short, long, default_value_t = 1000)]
        limit: u32,
    },
    /// Apply staged cost changes from a JSON file
    Apply {
        /// File with `products` and/or `categories` changes
        file: PathBuf,

        /// Changes per batch
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Writes in flight at once
        #[arg(long, default_value_t = 1)]
        concurrency: usize,

        /// Pause between batches in milliseconds
        #[arg(long, default_value_t = 100)]
        delay_ms: u64,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Maximum products fetched per category change
        #[arg(long, default_value_t = 1000)]
        category_limit: u32,
    },
    /// Call any model method (arguments as JSON)
    Call {
        /// Model name, e.g. `product.template`
        model: String,

        /// Method name
        method: String,

        /// Positional arguments as a JSON array
        #[arg(long, default_value = "[]")]
        args: String,

        /// Keyword arguments as a JSON object
        #[arg(long, default_value = "{}")]
        kwargs: String,
    },
}

#[derive(Subcommand)]
enum CountTarget {
    /// Count categories
    Categories {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Count active stockable products
    Products {
        #[arg(short, long)]
        category: Option<i64>,

        #[arg(short, long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("costos_cli=info,costos_odoo=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check => commands::check::run().await?,
        Commands::Stats => commands::catalog::stats().await?,
        Commands::Categories {
            limit,
            offset,
            search,
            company,
            with_counts,
            with_products,
        } => {
            let counts = if with_products {
                commands::catalog::Counts::NonEmptyOnly
            } else if with_counts {
                commands::catalog::Counts::Included
            } else {
                commands::catalog::Counts::Omitted
            };
            commands::catalog::categories(limit, offset, search, company, counts).await?;
        }
        Commands::Products {
            limit,
            offset,
            category,
            search,
            company,
        } => commands::catalog::products(limit, offset, category, search, company).await?,
        Commands::Count { target } => match target {
            CountTarget::Categories { search } => {
                commands::catalog::count_categories(search).await?;
            }
            CountTarget::Products { category, search } => {
                commands::catalog::count_products(category, search).await?;
            }
        },
        Commands::SetCost {
            product,
            cost,
            company,
        } => commands::cost::set_cost(product, cost, company).await?,
        Commands::Analyze { category, limit } => commands::analyze::run(category, limit).await?,
        Commands::Apply {
            file,
            batch_size,
            concurrency,
            delay_ms,
            dry_run,
            category_limit,
        } => {
            let options = costos_odoo::BatchOptions {
                batch_size,
                concurrency,
                inter_batch_delay: std::time::Duration::from_millis(delay_ms),
                dry_run,
            };
            commands::cost::apply(&file, &options, category_limit).await?;
        }
        Commands::Call {
            model,
            method,
            args,
            kwargs,
        } => commands::call::run(&model, &method, &args, &kwargs).await?,
    }
    Ok(())
}
