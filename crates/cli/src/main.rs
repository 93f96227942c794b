//! Bookstore CLI - browse the catalog and manage orders from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (the session is kept in .bookstore-credentials.json)
//! bookstore login -e user@example.com -p user123
//!
//! # Browse
//! bookstore books list --category "Sci-Fi"
//! bookstore genres list
//!
//! # Order two copies of b1 and one of b2, paying cash on delivery
//! bookstore orders place --book b1 --book b1 --book b2 \
//!     --name "Ada Lovelace" --email ada@example.com \
//!     --address "12 St James's Square" --city London --state LDN --postal "SW1Y 4JH"
//!
//! # Order history
//! bookstore orders list --status pending
//! bookstore orders cancel o42
//! ```
//!
//! # Environment Variables
//!
//! - `BOOKSTORE_API_URL` - Base URL of the bookstore API (required)
//! - `BOOKSTORE_CREDENTIALS_FILE` - Where the session is stored
//! - `RUST_LOG` - Log filter (default: `bookstore=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use bookstore_storefront::{ClientConfig, telemetry};
use clap::{Parser, Subcommand};

mod commands;

const DEFAULT_LOG_FILTER: &str = "bookstore=info,bookstore_cli=info,bookstore_storefront=info";

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(author, version, about = "Bookstore command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log in as it
    Signup {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Browse books
    Books {
        #[command(subcommand)]
        action: BookAction,
    },
    /// Browse genres
    Genres {
        #[command(subcommand)]
        action: GenreAction,
    },
    /// Place and manage orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Manage users (admin only)
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum BookAction {
    /// List books
    List {
        /// Only books in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one book
    Show { id: String },
}

#[derive(Subcommand)]
enum GenreAction {
    /// List genres
    List,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List your orders (or everyone's with --all)
    List {
        /// Only orders with this status (pending, completed, cancelled, closed)
        #[arg(short, long)]
        status: Option<String>,

        /// List every customer's orders (admin only)
        #[arg(long)]
        all: bool,
    },
    /// Cancel a pending order
    Cancel { id: String },
    /// Mark an order as completed (admin only)
    Complete { id: String },
    /// Close a completed order (admin only)
    Close { id: String },
    /// Place an order
    Place(commands::orders::PlaceArgs),
}

#[derive(Subcommand)]
enum UserAction {
    /// List users
    List,
    /// Delete a user
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .init();
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let _sentry_guard = telemetry::init(&config, DEFAULT_LOG_FILTER);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = commands::App::new(config)?;
    let _indicator = app.show_slow_loading();

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app, &email, password).await?;
        }
        Commands::Signup {
            email,
            password,
            name,
        } => commands::auth::signup(&app, &email, password, &name).await?,
        Commands::Logout => commands::auth::logout(&app)?,
        Commands::Whoami => commands::auth::whoami(&app)?,
        Commands::Books { action } => match action {
            BookAction::List { category } => {
                commands::catalog::list_books(&app, category.as_deref()).await?;
            }
            BookAction::Show { id } => commands::catalog::show_book(&app, &id).await?,
        },
        Commands::Genres { action } => match action {
            GenreAction::List => commands::catalog::list_genres(&app).await?,
        },
        Commands::Orders { action } => match action {
            OrderAction::List { status, all } => {
                commands::orders::list(&app, status.as_deref(), all).await?;
            }
            OrderAction::Cancel { id } => commands::orders::cancel(&app, &id).await?,
            OrderAction::Complete { id } => commands::orders::complete(&app, &id).await?,
            OrderAction::Close { id } => commands::orders::close(&app, &id).await?,
            OrderAction::Place(args) => commands::orders::place(&app, args).await?,
        },
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&app).await?,
            UserAction::Delete { id } => commands::users::delete(&app, &id).await?,
        },
    }
    Ok(())
}
