//! Nepostore CLI - tenant and route inspection, bulk product uploads.
//!
//! # Usage
//!
//! ```bash
//! # Which tenant and mode does a host resolve to?
//! np-cli resolve --host acme.nepostore.xyz
//! np-cli resolve --host localhost:3000 --query "tenant=acme"
//!
//! # Print the route tree a host gets, optionally resolving one path
//! np-cli routes --host acme.nepostore.xyz --path /checkout
//!
//! # Check a product CSV without uploading it
//! np-cli bulk-check products.csv
//!
//! # Check, then upload to a store
//! np-cli bulk-upload --tenant acme products.csv
//! ```
//!
//! # Commands
//!
//! - `resolve` - Resolve a host to a tenant and mode
//! - `routes` - Print a mode's route table
//! - `bulk-check` - Validate a bulk product CSV locally
//! - `bulk-upload` - Validate, then send a bulk product CSV to the API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "np-cli")]
#[command(author, version, about = "Nepostore CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a host into a tenant token and mode
    Resolve {
        /// Host header value, port allowed
        #[arg(long)]
        host: String,

        /// Query string, used for `tenant=` on local hosts
        #[arg(long, default_value = "")]
        query: String,

        /// Labels in the platform's base domain
        #[arg(long, default_value_t = nepostore_core::tenant::DEFAULT_BASE_LABELS)]
        base_labels: usize,
    },
    /// Print the route table a host is served with
    Routes {
        /// Host header value, port allowed
        #[arg(long)]
        host: String,

        /// Query string, used for `tenant=` on local hosts
        #[arg(long, default_value = "")]
        query: String,

        /// Build the shop table as if the store were under construction
        #[arg(long)]
        under_construction: bool,

        /// Dashboard origin used for the landing page's redirects
        #[arg(long, default_value = "https://app.nepostore.xyz")]
        dashboard_url: String,

        /// Also resolve this path against the table
        #[arg(long)]
        path: Option<String>,
    },
    /// Validate a bulk product CSV without uploading it
    BulkCheck {
        /// CSV file to check
        file: PathBuf,
    },
    /// Validate a bulk product CSV, then upload it
    BulkUpload {
        /// Store the products belong to
        #[arg(short, long)]
        tenant: String,

        /// CSV file to upload
        file: PathBuf,
    },
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
        Commands::Resolve {
            host,
            query,
            base_labels,
        } => commands::inspect::resolve(&host, &query, base_labels),
        Commands::Routes {
            host,
            query,
            under_construction,
            dashboard_url,
            path,
        } => commands::inspect::routes(
            &host,
            &query,
            under_construction,
            &dashboard_url,
            path.as_deref(),
        )?,
        Commands::BulkCheck { file } => {
            commands::bulk::check(&file)?;
        }
        Commands::BulkUpload { tenant, file } => commands::bulk::upload(&tenant, &file).await?,
    }
    Ok(())
}
