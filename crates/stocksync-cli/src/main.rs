mod orders;
mod products;
mod reconcile;
mod report;
mod rules;
mod stock;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::orders::OrdersCommands;
use crate::products::ProductsCommands;
use crate::rules::RulesCommands;

#[derive(Debug, Parser)]
#[command(name = "stocksync")]
#[command(about = "Keep Shopify inventory in line with the Hiper ERP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Copy Hiper stock quantities onto matching Shopify variants
    Stock {
        /// Match and report without writing to Shopify
        #[arg(long)]
        dry_run: bool,

        /// Keep running, starting a new pass this many seconds after the last one
        #[arg(long, value_name = "SECONDS")]
        watch: Option<u64>,
    },
    /// Storefront product maintenance
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// Sales-order transfer from Shopify into Hiper
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
    /// Inspect the matching rules file
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Stock { dry_run, watch }) => {
            let config = load_config()?;
            let matching_rules = stocksync_core::load_rules_or_default(&config.rules_path)?;
            stock::run_stock(&config, matching_rules, dry_run, watch).await?;
        }
        Some(Commands::Products {
            command: ProductsCommands::CreateMissing { dry_run, limit },
        }) => {
            let config = load_config()?;
            let matching_rules = stocksync_core::load_rules_or_default(&config.rules_path)?;
            products::run_create_missing(&config, matching_rules, dry_run, limit).await?;
        }
        Some(Commands::Orders {
            command: OrdersCommands::Sync { submit, max_orders },
        }) => {
            let config = load_config()?;
            orders::run_orders_sync(&config, submit, max_orders).await?;
        }
        Some(Commands::Rules {
            command: RulesCommands::Check { path },
        }) => {
            init_tracing("info")?;
            rules::run_rules_check(&path)?;
        }
        None => println!("stocksync: no command given (try --help)"),
    }

    Ok(())
}

/// Loads the environment configuration and starts logging at its level.
/// `RUST_LOG` wins over the configured level when set.
fn load_config() -> anyhow::Result<stocksync_core::AppConfig> {
    let config = stocksync_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    Ok(config)
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[cfg(test)]
mod tests;
