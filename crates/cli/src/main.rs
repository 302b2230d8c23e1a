//! Rocket Shoes CLI - Inspect and edit the persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cli cart show
//!
//! # Add one unit of product 3
//! rs-cli cart add 3
//!
//! # Set product 3 to 2 units
//! rs-cli cart update 3 2
//!
//! # Remove product 3
//! rs-cli cart remove 3
//!
//! # Delete the persisted cart
//! rs-cli cart clear
//! ```
//!
//! Configuration comes from the same environment as the storefront
//! (`CATALOG_API_URL`, `CART_STORAGE_PATH`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocket_shoes_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "Rocket Shoes CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,
        /// New amount (at least 1)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Delete the persisted cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing (RUST_LOG controls verbosity, quiet by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
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
        Commands::Cart { action } => {
            let store = commands::cart::open_store()?;
            match action {
                CartAction::Show => commands::cart::show(&store),
                CartAction::Add { product_id } => commands::cart::add(&store, product_id).await?,
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&store, product_id).await?;
                }
                CartAction::Update { product_id, amount } => {
                    commands::cart::update(&store, product_id, amount).await?;
                }
                CartAction::Clear => commands::cart::clear(&store).await?,
            }
        }
    }
    Ok(())
}
