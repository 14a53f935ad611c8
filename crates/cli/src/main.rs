//! Brewhouse CLI - database migrations and order pipeline tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the order schema and the session table
//! bh-cli migrate
//!
//! # Inspect orders
//! bh-cli orders list --status pending
//! bh-cli orders show 42
//!
//! # Move an order along
//! bh-cli orders advance 42
//! bh-cli orders transition 42 cancelled
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use brewhouse_core::{OrderId, OrderStatus};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bh-cli")]
#[command(author, version, about = "Brewhouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect and move orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Show one order
    Show { id: OrderId },
    /// Move an order one step along the pipeline
    Advance { id: OrderId },
    /// Move an order to a named status
    Transition { id: OrderId, status: OrderStatus },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { status } => commands::orders::list(status).await?,
            OrdersAction::Show { id } => commands::orders::show(id).await?,
            OrdersAction::Advance { id } => commands::orders::advance(id).await?,
            OrdersAction::Transition { id, status } => {
                commands::orders::transition(id, status).await?;
            }
        },
    }
    Ok(())
}
