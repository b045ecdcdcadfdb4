//! Shopfront CLI - browse the catalogue and manage the local cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse products
//! shopfront products list --page 2
//! shopfront products list --search lamp
//! shopfront products list --categories 1,4
//! shopfront products show <DOCUMENT_ID>
//!
//! # Categories available for filtering
//! shopfront categories
//!
//! # Cart
//! shopfront cart add <DOCUMENT_ID>
//! shopfront cart show
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_BASE_URL` - Strapi REST API base URL
//! - `SHOPFRONT_API_TOKEN` - Optional Strapi API token
//! - `SHOPFRONT_PUBLIC_URL` - Listing URL that filter state is written into
//! - `SHOPFRONT_STORAGE_DIR` - Directory holding the persisted cart
//! - `SENTRY_DSN` - Optional Sentry DSN

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use shopfront_core::CategoryId;
use shopfront_storefront::Storefront;
use shopfront_storefront::config::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::products::ListArgs;

#[derive(Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List product categories
    Categories,
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List one page of products
    List {
        /// Page number (1-based)
        #[arg(short, long)]
        page: Option<u32>,

        /// Search product titles
        #[arg(short, long, conflicts_with = "categories")]
        search: Option<String>,

        /// Comma-separated category ids
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<CategoryId>,

        /// Listing URL to restore (overrides the other flags)
        #[arg(long, conflicts_with_all = ["page", "search", "categories"])]
        url: Option<String>,
    },
    /// Show one product with similar products
    Show {
        /// Product document id
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add one unit of a product
    Add {
        /// Product document id
        id: String,
    },
    /// Remove a product from the cart
    Remove {
        /// Product document id
        id: String,
    },
    /// Set the quantity of a product (0 removes it)
    Set {
        /// Product document id
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every item
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront_storefront=info,shopfront_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(shopfront_storefront::AppError::from(e).into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.capture();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> commands::Result<()> {
    let storefront = Storefront::from_config(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                page,
                search,
                categories,
                url,
            } => {
                let args = ListArgs {
                    page,
                    search,
                    categories,
                    url,
                };
                commands::products::list(&storefront, &args, &mut out).await?;
            }
            ProductsAction::Show { id } => {
                commands::products::show(&storefront, &id, &mut out).await?;
            }
        },
        Commands::Categories => commands::categories::list(&storefront, &mut out).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront, &mut out)?,
            CartAction::Add { id } => commands::cart::add(&storefront, &id, &mut out).await?,
            CartAction::Remove { id } => commands::cart::remove(&storefront, &id, &mut out)?,
            CartAction::Set { id, quantity } => {
                commands::cart::set(&storefront, &id, quantity, &mut out)?;
            }
            CartAction::Clear => commands::cart::clear(&storefront, &mut out)?,
        },
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_category_list() {
        let cli = Cli::try_parse_from(["shopfront", "products", "list", "-c", "1,4"]).unwrap();
        let Commands::Products {
            action: ProductsAction::List { categories, .. },
        } = cli.command
        else {
            panic!("expected products list");
        };
        assert_eq!(categories, vec![CategoryId::new(1), CategoryId::new(4)]);
    }

    #[test]
    fn test_search_conflicts_with_categories() {
        let result = Cli::try_parse_from([
            "shopfront", "products", "list", "--search", "lamp", "--categories", "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cart_set_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["shopfront", "cart", "set", "abc", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart {
                action: CartAction::Set { quantity: -1, .. }
            }
        ));
    }
}
