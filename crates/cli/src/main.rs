//! Anime Tribes CLI - drive the admin session, cart and checkout from a shell.
//!
//! State persists between invocations under a state directory, one JSON
//! file per storage key, the same layout the stores use in any client.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as an order manager and list the visible menu
//! at-cli admin login --id adm_1 -n "Nami" -e nami@example.com -r order-manager
//! at-cli admin menu
//!
//! # Fill the cart and check out with a digital wallet
//! at-cli cart add --id 1 --name "Straw Hat" --price 29.99 --qty 2 --size M
//! at-cli checkout --name "Nami" --email nami@example.com \
//!     --address1 "1 Main St" --city X --state Y --zip 00000
//!
//! # Derive and check a product slug
//! at-cli slug generate "Straw Hat (Replica)"
//! at-cli slug check straw-hat-replica
//! ```
//!
//! # Commands
//!
//! - `admin` - Log in/out, inspect permissions, sidebar and area access
//! - `cart` - Add, remove, re-quantify, clear and show cart lines
//! - `checkout` - Run a non-interactive checkout against the current cart
//! - `slug` - Generate slugs and check availability against the backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anime_tribes_core::{Permission, ProductId, RoleKind};
use anime_tribes_storefront::config::StorefrontConfig;

mod commands;
mod storage;

use storage::FileStorage;

#[derive(Parser)]
#[command(name = "at-cli")]
#[command(author, version, about = "Anime Tribes CLI tools")]
struct Cli {
    /// Directory holding persisted session and cart state
    #[arg(long, env = "AT_STATE_DIR", default_value = ".anime-tribes", global = true)]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Admin session commands
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Cart commands
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// Product slug tools
    Slug {
        #[command(subcommand)]
        action: SlugAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in as an admin
    Login {
        /// Admin id
        #[arg(long)]
        id: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Role tag (`super-admin`, `product-manager`, ..., `custom`)
        #[arg(short, long)]
        role: RoleKind,

        /// Display name of a custom role
        #[arg(long)]
        custom_name: Option<String>,

        /// Explicit permission, repeatable; overrides the role defaults
        #[arg(short, long = "permission")]
        permissions: Vec<Permission>,

        /// Use the super admin entry point
        #[arg(long)]
        super_admin: bool,
    },
    /// Log out
    Logout,
    /// Show the signed-in admin
    Whoami,
    /// Check a permission
    Can {
        /// Permission tag, e.g. `manage_orders`
        permission: Permission,
    },
    /// Show the sidebar visible to the signed-in admin
    Menu,
    /// Check whether an admin path may be viewed
    Access {
        /// Path, e.g. `/superadmin/users/roles`
        path: String,
    },
}

/// Identifies one cart line.
#[derive(Args)]
struct LineArgs {
    /// Product id
    #[arg(long)]
    id: u32,

    /// Selected size
    #[arg(long)]
    size: Option<String>,

    /// Selected color
    #[arg(long)]
    color: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product, merging with an identical selection
    Add {
        #[command(flatten)]
        line: LineArgs,

        /// Product name
        #[arg(long)]
        name: String,

        /// Unit price, e.g. 29.99
        #[arg(long)]
        price: Decimal,

        /// Quantity to add
        #[arg(long, default_value_t = 1)]
        qty: u32,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a line
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    /// Set the quantity of a line; 0 removes it
    SetQty {
        #[command(flatten)]
        line: LineArgs,

        /// New quantity
        #[arg(long)]
        qty: u32,
    },
    /// Empty the cart
    Clear,
    /// Show lines and the order summary
    Show,
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Check out as a guest, verifying a phone number first
    #[arg(long)]
    guest: bool,

    /// Phone number (guest)
    #[arg(long, required_if_eq("guest", "true"))]
    phone: Option<String>,

    /// Verification code (guest)
    #[arg(long, required_if_eq("guest", "true"))]
    code: Option<String>,

    /// First name (guest)
    #[arg(long, default_value = "")]
    first_name: String,

    /// Last name (guest)
    #[arg(long, default_value = "")]
    last_name: String,

    /// Customer name (signed-in path)
    #[arg(long, default_value = "")]
    name: String,

    /// Contact email
    #[arg(long)]
    email: String,

    /// Recipient; defaults to the contact name
    #[arg(long)]
    full_name: Option<String>,

    #[arg(long)]
    address1: String,

    #[arg(long, default_value = "")]
    address2: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: String,

    /// Postal code
    #[arg(long)]
    zip: String,

    #[arg(long, default_value = "United States")]
    country: String,

    /// Card number; pays by digital wallet when omitted
    #[arg(long)]
    card_number: Option<String>,

    /// Name on the card
    #[arg(long, default_value = "")]
    card_name: String,

    /// Card expiry, `MM/YY`
    #[arg(long, default_value = "")]
    expiry: String,

    #[arg(long, default_value = "")]
    cvv: String,

    /// Send the order to the backend instead of simulating it
    #[arg(long)]
    live: bool,
}

#[derive(Subcommand)]
enum SlugAction {
    /// Derive a slug from a product name
    Generate {
        /// Product name
        name: String,
    },
    /// Ask the backend whether a slug is taken
    Check {
        /// Slug to check
        slug: String,
    },
}

/// Initialize Sentry when a DSN is configured; the guard flushes on drop.
fn init_sentry(dsn: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    guard.is_enabled().then_some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // An invalid storefront config is reported by the command that needs it
    let sentry_dsn = StorefrontConfig::from_env().ok().and_then(|c| c.sentry_dsn);
    let sentry_guard = init_sentry(sentry_dsn.as_deref());

    // Initialize tracing; command output goes through it
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "at_cli=info,anime_tribes_storefront=warn,anime_tribes_admin=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // process::exit skips destructors, so flush pending events first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::new(cli.state_dir);

    match cli.command {
        Commands::Admin { action } => {
            let mut sessions = commands::admin::open(storage);
            match action {
                AdminAction::Login {
                    id,
                    name,
                    email,
                    role,
                    custom_name,
                    permissions,
                    super_admin,
                } => {
                    let login = commands::admin::Login {
                        id,
                        name,
                        email,
                        role,
                        custom_name,
                        permissions,
                        super_admin,
                    };
                    commands::admin::login(&mut sessions, login)?;
                }
                AdminAction::Logout => commands::admin::logout(&mut sessions)?,
                AdminAction::Whoami => commands::admin::whoami(&sessions),
                AdminAction::Can { permission } => commands::admin::can(&sessions, permission)?,
                AdminAction::Menu => commands::admin::menu(&sessions)?,
                AdminAction::Access { path } => commands::admin::access(&sessions, &path),
            }
        }
        Commands::Cart { action } => {
            let mut cart = commands::cart::open(storage);
            match action {
                CartAction::Add {
                    line,
                    name,
                    price,
                    qty,
                    image,
                } => {
                    let mut item =
                        commands::cart::line(ProductId::new(line.id), name, price, qty, line.size, line.color);
                    if let Some(url) = image {
                        item = item.with_image(url);
                    }
                    commands::cart::add(&mut cart, item)?;
                }
                CartAction::Remove { line } => {
                    commands::cart::remove(&mut cart, &commands::cart::key(line.id, line.size, line.color))?;
                }
                CartAction::SetQty { line, qty } => {
                    commands::cart::set_quantity(
                        &mut cart,
                        &commands::cart::key(line.id, line.size, line.color),
                        qty,
                    )?;
                }
                CartAction::Clear => commands::cart::clear(&mut cart)?,
                CartAction::Show => commands::cart::show(&cart),
            }
        }
        Commands::Checkout(args) => commands::checkout::run(storage, args).await?,
        Commands::Slug { action } => match action {
            SlugAction::Generate { name } => commands::slug::generate(&name),
            SlugAction::Check { slug } => commands::slug::check(&slug).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod test_main {
    use super::*;

    #[test]
    fn test_sentry_disabled_without_dsn() {
        assert!(init_sentry(None).is_none());
    }
}
