//! Tradepost operator binary.
//!
//! Provisions a store (migrate, register actors, grant stock, flag
//! quarantine) and submits trade requests read from JSON, printing the
//! reply the request-handling layer would send.
//!
//! Logs go to stderr; command output goes to stdout as JSON.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tradepost_exchange::{
    InMemoryEligibilityCache, ResourceCatalog, TradeOrchestrator, TradeReply,
};
use tradepost_store::Store;
use tradepost_types::constants::{ENGINE_NAME, VERSION};
use tradepost_types::{ActorId, TradeRequest, TradepostConfig};

/// Tradepost barter exchange
#[derive(Parser)]
#[command(name = "tradepost")]
#[command(about = "Two-party barter exchange over a shared inventory store")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "TRADEPOST_CONFIG")]
    config: Option<PathBuf>,

    /// Database file (overrides config)
    #[arg(long, env = "TRADEPOST_DB")]
    db: Option<PathBuf>,

    /// Lock wait bound in milliseconds (overrides config)
    #[arg(long)]
    lock_timeout_ms: Option<u64>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create tables and provision the catalog
    Migrate,

    /// Print the catalog
    Catalog,

    /// Register a new actor
    Register { name: String },

    /// Add stock to an actor's inventory
    Grant {
        #[arg(long)]
        actor: i64,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        quantity: u32,
    },

    /// Flag an actor as quarantined (permanent)
    Flag {
        #[arg(long)]
        actor: i64,
    },

    /// Print an actor's inventory
    Inventory {
        #[arg(long)]
        actor: i64,
    },

    /// Submit a trade request (JSON file, or stdin when omitted)
    Trade { request: Option<PathBuf> },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => TradepostConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TradepostConfig::default(),
    };
    if let Some(db) = cli.db {
        config.store.path = db;
    }
    if let Some(ms) = cli.lock_timeout_ms {
        config.store.lock_timeout_ms = ms;
    }
    config.validate()?;

    let mut store = Store::open(&config.store)
        .with_context(|| format!("opening store at {}", config.store.path.display()))?;

    match cli.command {
        Command::Migrate => {
            store.migrate(&config.catalog)?;
            info!(path = %config.store.path.display(), "{ENGINE_NAME} v{VERSION} store ready");
            print_json(&json!({ "migrated": true }));
        }
        Command::Catalog => {
            let catalog: Vec<_> = store
                .catalog()?
                .into_iter()
                .map(|r| json!({ "name": r.name, "value_weight": r.value_weight }))
                .collect();
            print_json(&json!(catalog));
        }
        Command::Register { name } => {
            let id = store.register_actor(&name)?;
            print_json(&json!({ "id": id, "name": name }));
        }
        Command::Grant {
            actor,
            resource,
            quantity,
        } => {
            let actor = ActorId(actor);
            store.grant(actor, &resource, quantity)?;
            print_json(&json!({ "actor": actor, "inventory": store.inventory_of(actor)? }));
        }
        Command::Flag { actor } => {
            let actor = ActorId(actor);
            store.flag_quarantined(actor)?;
            print_json(&json!({ "actor": actor, "quarantined": true }));
        }
        Command::Inventory { actor } => {
            let actor = ActorId(actor);
            print_json(&json!({
                "actor": actor,
                "quarantined": store.is_quarantined(actor)?,
                "inventory": store.inventory_of(actor)?,
            }));
        }
        Command::Trade { request } => {
            let request = read_request(request.as_ref())?;
            let catalog = Arc::new(ResourceCatalog::load(&store)?);
            let exchange =
                TradeOrchestrator::new(catalog, Arc::new(InMemoryEligibilityCache::new()));
            let outcome = exchange.execute(&mut store, &request);
            let reply = TradeReply::from(&outcome);
            print_json(&json!({ "status": reply.status, "body": reply.body }));
            if !reply.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{level},tradepost=debug").into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_request(path: Option<&PathBuf>) -> Result<TradeRequest> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading trade request {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading trade request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing trade request")
}

fn print_json(value: &serde_json::Value) {
    println!("{value}");
}
