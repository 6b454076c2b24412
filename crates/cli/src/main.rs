//! MarketMate CLI - operator tools for the admin backend.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first admin (there is no self-registration)
//! mm-cli admin create -e admin@example.com -p 'a long password'
//!
//! # List admins
//! mm-cli admin list
//!
//! # Reset a password
//! mm-cli admin set-password -e admin@example.com -p 'another long password'
//!
//! # Create the indexes the server relies on
//! mm-cli db indexes
//! ```
//!
//! Passwords can also come from `MM_ADMIN_PASSWORD` to keep them out of
//! shell history. Database settings are read from `MONGODB_URI`,
//! `MONGODB_DATABASE` and `MONGODB_MAX_POOL_SIZE`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mm-cli")]
#[command(author, version, about = "MarketMate admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long, env = "MM_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List admins
    List,
    /// Replace an admin's password
    SetPassword {
        /// Email of the admin to update
        #[arg(short, long)]
        email: String,

        /// New password (at least 8 characters)
        #[arg(short, long, env = "MM_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the admin and session indexes
    Indexes,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => {
                commands::admin::create(&email, &password).await?;
            }
            AdminAction::List => commands::admin::list().await?,
            AdminAction::SetPassword { email, password } => {
                commands::admin::set_password(&email, &password).await?;
            }
        },
        Commands::Db { action } => match action {
            DbAction::Indexes => commands::db::indexes().await?,
        },
    }
    Ok(())
}
