//! Stampcard CLI - Database migrations and loyalty management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! stampcard migrate
//!
//! # Register a customer and stamp day 0
//! stampcard customer register -n "Asha Rao" -m +919876543210
//! stampcard customer stamp RK4821 0
//!
//! # Print the report with insights
//! stampcard report --insights
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `customer` - Register, look up, stamp, reset and delete customers
//! - `report` - Print the loyalty report as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "stampcard")]
#[command(author, version, about = "Stampcard loyalty CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Print the loyalty report
    Report {
        /// Include advisory insights
        #[arg(short, long)]
        insights: bool,
    },
}

#[derive(Debug, Subcommand)]
enum CustomerAction {
    /// Register a new customer
    Register {
        /// Customer display name
        #[arg(short, long)]
        name: String,

        /// Mobile number (+91 followed by 10 digits)
        #[arg(short, long)]
        mobile: String,
    },
    /// Look a customer up by id (RK####) or mobile number
    Show { term: String },
    /// List customers, newest first
    List {
        /// Filter on name, id or mobile
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Toggle one day (0-5) on a customer's card
    Stamp { customer_id: String, day: usize },
    /// Clear every stamp on a customer's card
    Reset { customer_id: String },
    /// Delete a customer
    Delete { customer_id: String },
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
        Commands::Customer { action } => match action {
            CustomerAction::Register { name, mobile } => {
                commands::customer::register(&name, &mobile).await?;
            }
            CustomerAction::Show { term } => commands::customer::show(&term).await?,
            CustomerAction::List { query } => {
                commands::customer::list(query.as_deref()).await?;
            }
            CustomerAction::Stamp { customer_id, day } => {
                commands::customer::stamp(&customer_id, day).await?;
            }
            CustomerAction::Reset { customer_id } => {
                commands::customer::reset(&customer_id).await?;
            }
            CustomerAction::Delete { customer_id } => {
                commands::customer::delete(&customer_id).await?;
            }
        },
        Commands::Report { insights } => commands::report::run(insights).await?,
    }
    Ok(())
}
