//! Pawtopia CLI - Database migrations and store management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pawtopia-cli migrate
//!
//! # Create an admin account
//! pawtopia-cli admin create -u store_admin -p 'a long passphrase'
//!
//! # Load or refresh the product catalog
//! pawtopia-cli seed products -f crates/cli/seed/products.yaml
//! ```
//!
//! All commands read `PAWTOPIA_DATABASE_URL` (falling back to `DATABASE_URL`),
//! loading `.env` first if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pawtopia-cli")]
#[command(author, version, about = "Pawtopia CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database from YAML files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert or update catalog products by name
    Products {
        /// Path to the YAML catalog
        #[arg(short, long)]
        file: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { username, password } => {
                commands::admin::create(&username, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => {
                commands::seed::products(&file).await?;
            }
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
    fn test_parses_admin_create() {
        let cli = Cli::try_parse_from([
            "pawtopia-cli",
            "admin",
            "create",
            "-u",
            "store_admin",
            "-p",
            "correct horse battery",
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::Create { ref username, .. }
            } if username == "store_admin"
        ));
    }

    #[test]
    fn test_seed_requires_file() {
        assert!(Cli::try_parse_from(["pawtopia-cli", "seed", "products"]).is_err());
    }
}
