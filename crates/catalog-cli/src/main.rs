//! catalog CLI
//!
//! Reconciles declared schemas and runs filtered listings against a SQLite store.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use catalog_cli::parse_param;
use catalog_schema::{dialect_for, Manifest};
use catalog_store::{Store, StoreConfig};

/// Schema reconciliation and filtered listings.
#[derive(Parser)]
#[command(name = "catalog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database: String,

    /// Maximum pooled connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Per-statement timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add missing columns declared in a manifest.
    Reconcile {
        /// Manifest file.
        #[arg(short, long)]
        manifest: PathBuf,

        /// Table to reconcile (all if not specified).
        #[arg(short, long)]
        table: Option<String>,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,

        /// DDL dialect (sqlite or mysql).
        #[arg(long, default_value = "sqlite")]
        dialect: String,
    },

    /// Show the live columns of a table.
    Inspect {
        /// Table name.
        table: String,
    },

    /// Run a listing resource and print the page as JSON.
    List {
        /// Resource name.
        resource: String,

        /// Manifest file.
        #[arg(short, long)]
        manifest: PathBuf,

        /// Listing parameter, repeatable.
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = StoreConfig::new(cli.database)
        .max_connections(cli.max_connections)
        .statement_timeout(Duration::from_secs(cli.timeout_secs));
    let store = Store::connect(&config).await?;

    match cli.command {
        Commands::Reconcile {
            manifest,
            table,
            dry_run,
            dialect: dialect_name,
        } => {
            let Some(dialect) = dialect_for(&dialect_name) else {
                bail!("unknown dialect '{dialect_name}', expected sqlite or mysql");
            };
            if !dry_run && dialect.name() != "sqlite" {
                bail!("the store is SQLite; use --dry-run to render {} DDL", dialect.name());
            }
            let manifest = Manifest::load(manifest)?;

            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
                let plans =
                    catalog_cli::plan(&store, &manifest, table.as_deref(), dialect.as_ref())
                        .await?;
                for plan in plans {
                    for stmt in plan.statements() {
                        println!("{stmt};");
                    }
                }
            } else {
                let diffs =
                    catalog_cli::reconcile(&store, &manifest, table.as_deref(), dialect.as_ref())
                        .await?;
                println!("{}", serde_json::to_string_pretty(&diffs)?);
                catalog_cli::ensure_complete(diffs)?;
            }
        }

        Commands::Inspect { table } => {
            for column in catalog_cli::inspect(&store, &table).await? {
                println!("{column}");
            }
        }

        Commands::List {
            resource,
            manifest,
            params,
        } => {
            let manifest = Manifest::load(manifest)?;
            let page = catalog_cli::list(&store, &manifest, &resource, &params).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
    }

    Ok(())
}
