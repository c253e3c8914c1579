//! HandyHub CLI - cart, session and booking from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session persists in HANDYHUB_STATE_PATH)
//! hh login -e asha@example.in -p 'secret'
//!
//! # Browse and fill the cart
//! hh catalog categories
//! hh catalog services cat1 --search tap
//! hh cart add cat1 svc1
//! hh cart qty svc1 3
//! hh cart note svc1 "Kitchen tap drips"
//! hh cart show
//!
//! # Book
//! hh addresses
//! hh slots --date 2026-10-20
//! hh checkout --date 2026-10-20 --slot slot1
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami` - Session lifecycle
//! - `catalog` - Categories and services
//! - `cart` - Local cart (add, remove, qty, note, clear, show)
//! - `addresses`, `slots`, `checkout`, `pay` - Booking flow

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use handyhub_client::ClientConfig;
use handyhub_client::api::PaymentMethod;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::App;

#[derive(Parser)]
#[command(name = "hh")]
#[command(author, version, about = "HandyHub command-line client")]
struct Cli {
    /// Keep cart and session in memory only (nothing is written to disk)
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "HANDYHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a customer account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(short, long, env = "HANDYHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the local session
    Logout,
    /// Show the signed-in profile
    Whoami {
        /// Re-fetch the profile from the backend
        #[arg(long)]
        refresh: bool,
    },
    /// Browse the service catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List saved addresses
    Addresses,
    /// List visit windows for a date
    Slots {
        #[arg(long)]
        date: NaiveDate,

        /// Include fully booked windows
        #[arg(long)]
        all: bool,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// Address id (defaults to the saved default address)
        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        date: NaiveDate,

        #[arg(long)]
        slot: String,

        /// `cash` or `online`
        #[arg(long, default_value = "cash", value_parser = parse_payment_method)]
        pay: PaymentMethod,

        #[arg(long)]
        notes: Option<String>,
    },
    /// Confirm an online payment for an order
    Pay {
        #[arg(long)]
        order: String,

        #[arg(long)]
        payment_id: String,

        #[arg(long)]
        signature: Option<String>,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List categories
    Categories,
    /// List services in a category
    Services {
        category_id: String,

        /// Only show services whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a service
    Add { category_id: String, service_id: String },
    /// Remove a service
    Remove { service_id: String },
    /// Set a quantity (0 or less removes the service)
    Qty {
        service_id: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Describe the problem for a service
    Note { service_id: String, text: String },
    /// Empty the cart
    Clear,
    /// Show cart contents and totals
    Show,
}

fn parse_payment_method(s: &str) -> Result<PaymentMethod, String> {
    match s.to_ascii_lowercase().as_str() {
        "cash" => Ok(PaymentMethod::Cash),
        "online" => Ok(PaymentMethod::Online),
        other => Err(format!("unknown payment method: {other}")),
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
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
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::failure(&e.to_string());
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "handyhub_client=warn,handyhub_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        output::failure(&e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CommandError> {
    let app = if cli.ephemeral {
        App::ephemeral(config)?
    } else {
        App::open(config)?
    };

    match cli.command {
        Commands::Login { email, password } => commands::auth::login(&app, &email, password).await?,
        Commands::Register {
            name,
            email,
            phone,
            password,
        } => commands::auth::register(&app, name, &email, phone, password).await?,
        Commands::Logout => commands::auth::logout(&app),
        Commands::Whoami { refresh } => commands::auth::whoami(&app, refresh).await?,
        Commands::Catalog { action } => match action {
            CatalogAction::Categories => commands::catalog::categories(&app).await?,
            CatalogAction::Services {
                category_id,
                search,
            } => commands::catalog::services(&app, &category_id, search.as_deref()).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Add {
                category_id,
                service_id,
            } => commands::cart::add(&app, &category_id, &service_id).await?,
            CartAction::Remove { service_id } => commands::cart::remove(&app, &service_id),
            CartAction::Qty {
                service_id,
                quantity,
            } => commands::cart::set_quantity(&app, &service_id, quantity),
            CartAction::Note { service_id, text } => {
                commands::cart::note(&app, &service_id, &text);
            }
            CartAction::Clear => commands::cart::clear(&app),
            CartAction::Show => commands::cart::show(&app),
        },
        Commands::Addresses => commands::booking::addresses(&app).await?,
        Commands::Slots { date, all } => commands::booking::slots(&app, date, !all).await?,
        Commands::Checkout {
            address,
            date,
            slot,
            pay,
            notes,
        } => commands::booking::checkout(&app, address, date, slot, pay, notes).await?,
        Commands::Pay {
            order,
            payment_id,
            signature,
        } => commands::booking::pay(&app, order, payment_id, signature).await?,
    }
    Ok(())
}
