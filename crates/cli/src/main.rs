//! QuickShop CLI - manage a QuickShop store from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is saved for later commands)
//! qs-cli login -e owner@example.com
//!
//! # Today's numbers and recent orders
//! qs-cli dashboard
//!
//! # Orders waiting to be prepared
//! qs-cli orders list --status new --limit 20
//!
//! # Move an order along
//! qs-cli orders set-status 1234 preparing
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `status` - Session management
//! - `dashboard` - Store statistics
//! - `orders` - List, show, update and delete orders
//! - `products` / `categories` / `media` - Catalog browsing
//! - `store` - Store profile
//! - `upload` - Upload an image
//! - `storage` - Inspect or reset saved credentials
//!
//! # Environment Variables
//!
//! - `QUICKSHOP_API_BASE_URL` / `QUICKSHOP_STORES_BASE_URL` - Server addresses
//! - `QUICKSHOP_PASSWORD` - Password for `login` when `--password` is omitted
//! - `QUICKSHOP_LOG_FORMAT` - `json` for structured logs
//! - `SENTRY_DSN` - Enables error reporting
//! - `RUST_LOG` - Log filter

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use quickshop_core::{CategoryId, OrderId, ProductId, StoreSlug};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use error::CliError;

#[derive(Parser)]
#[command(name = "qs-cli")]
#[command(author, version, about = "QuickShop store management")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and save the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "QUICKSHOP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Check the saved session against the server
    Status,
    /// Show store statistics
    Dashboard,
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List product categories
    Categories,
    /// List uploaded media
    Media {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Items per page
        #[arg(long)]
        limit: Option<u32>,

        /// Media type filter
        #[arg(long = "type")]
        filter_type: Option<String>,
    },
    /// Show the store profile
    Store,
    /// Upload an image file
    Upload {
        /// File to upload
        file: PathBuf,
    },
    /// Inspect or reset saved credentials
    Storage {
        #[command(subcommand)]
        action: StorageAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List {
        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Orders per page
        #[arg(long)]
        limit: Option<u32>,

        /// Status code or label (`new`, `preparing`, `בהכנה`, ...)
        #[arg(long)]
        status: Option<String>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Earliest order date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest order date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show one order
    Show { id: OrderId },
    /// Change an order's status on the server
    SetStatus {
        id: OrderId,
        /// Status code or label
        status: String,
    },
    /// Delete an order on the server
    Delete {
        id: OrderId,

        /// Skip the confirmation guard
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products of the signed-in store
    List {
        /// Query another store instead of the signed-in one
        #[arg(long)]
        store: Option<StoreSlug>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Products per page
        #[arg(long)]
        limit: Option<u32>,

        /// Only products in this category
        #[arg(long)]
        category: Option<CategoryId>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Sort key
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Show one product
    Show { id: ProductId },
    /// List gallery images of a product
    Gallery { id: ProductId },
}

#[derive(Subcommand)]
enum StorageAction {
    /// Print saved entries with the token redacted
    Show,
    /// Remove every saved entry
    Clear,
    /// Remove saved credentials only
    ClearAuth,
}

/// Initialize Sentry when `SENTRY_DSN` is set. The guard must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|s| !s.trim().is_empty())?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickshop_client=warn,quickshop_cli=info".into());

    let json = std::env::var("QUICKSHOP_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        // Flush pending Sentry events; exit skips destructors
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let app = commands::App::from_env()?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app, &email, password.into()).await?;
        }
        Commands::Logout => commands::auth::logout(&app).await,
        Commands::Status => commands::auth::status(&app).await?,
        Commands::Dashboard => commands::store::dashboard(&app).await?,
        Commands::Orders { action } => match action {
            OrdersAction::List {
                page,
                limit,
                status,
                search,
                from,
                to,
            } => {
                let filters = commands::orders::filters(page, limit, status.as_deref(), search, from, to);
                commands::orders::list(&app, filters).await?;
            }
            OrdersAction::Show { id } => commands::orders::show(&app, id).await?,
            OrdersAction::SetStatus { id, status } => {
                commands::orders::set_status(&app, id, &status).await?;
            }
            OrdersAction::Delete { id, yes } => commands::orders::delete(&app, id, yes).await?,
        },
        Commands::Products { action } => match action {
            ProductsAction::List {
                store,
                page,
                limit,
                category,
                search,
                sort,
                desc,
            } => {
                let filters = commands::catalog::filters(page, limit, category, search, sort, desc);
                commands::catalog::list_products(&app, store, filters).await?;
            }
            ProductsAction::Show { id } => commands::catalog::show_product(&app, id).await?,
            ProductsAction::Gallery { id } => commands::catalog::gallery(&app, id).await?,
        },
        Commands::Categories => commands::catalog::categories(&app).await?,
        Commands::Media {
            page,
            limit,
            filter_type,
        } => commands::catalog::media(&app, page, limit, filter_type).await?,
        Commands::Store => commands::store::store_info(&app).await?,
        Commands::Upload { file } => commands::store::upload(&app, &file).await?,
        Commands::Storage { action } => match action {
            StorageAction::Show => commands::storage::show(&app).await?,
            StorageAction::Clear => commands::storage::clear(&app).await?,
            StorageAction::ClearAuth => commands::storage::clear_auth(&app).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_orders_list() {
        let cli = Cli::try_parse_from([
            "qs-cli", "orders", "list", "--status", "new", "--limit", "3", "--from", "2025-01-01",
        ]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_slug() {
        let cli = Cli::try_parse_from(["qs-cli", "products", "list", "--store", "../x"]);
        assert!(cli.is_err());
    }
}
