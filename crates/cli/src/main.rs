//! Wayside CLI - operational tooling for the Wayside backends.
//!
//! Covers the tasks that should never live behind an HTTP endpoint:
//! running database migrations, creating staff accounts for the admin
//! dashboard, and loading demo data into a fresh database.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use std::process::exit;

mod commands;

#[derive(Parser)]
#[command(name = "wayside-cli")]
#[command(about = "Operational tools for the Wayside church platform")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,

    /// Manage admin dashboard staff accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Load demo data into the database
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a staff account
    Create {
        /// Email address for the new staff account
        #[arg(long)]
        email: String,

        /// Display name for the new staff account
        #[arg(long)]
        name: String,

        /// Password (generated and printed when omitted)
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            commands::migrate::run().await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, password.as_deref()).await?;
            }
        },
        Commands::Seed => {
            commands::seed::run().await?;
        }
    }

    Ok(())
}
