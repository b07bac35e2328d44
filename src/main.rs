//! # ParkAlloc: daily parking allocation
//!
//! Staff and visitors request a slot for the next operating day; once a day
//! the allocator fills pool A and pool B, writes History and posts a summary.
//!
//! Usage:
//!   parkalloc status                       # Target date, requests, capacities
//!   parkalloc request staff Kim            # Request a slot
//!   parkalloc run                          # One-shot daily run (cron/CI)
//!   parkalloc daemon                       # Built-in daily scheduler
//!   parkalloc history list --from 2026-10-01

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ConfigCommand, Context, HistoryCommand, MemberCommand, RequestCommand, RunArgs};

#[derive(Parser)]
#[command(
    name = "parkalloc",
    version,
    about = "🅿️ ParkAlloc: daily parking allocation for staff and visitors"
)]
struct Cli {
    /// Config file (default: $PARKALLOC_CONFIG or ~/.parkalloc/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines (for the daemon under a log collector)
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the target date, pending requests and capacities.
    Status {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Run the daily allocation once.
    Run(RunArgs),

    /// Run the daily scheduler until interrupted.
    Daemon,

    /// Staff and guest requests.
    #[command(subcommand)]
    Request(RequestCommand),

    /// Member records.
    #[command(subcommand)]
    Member(MemberCommand),

    /// Allocation history.
    #[command(subcommand)]
    History(HistoryCommand),

    /// Configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "debug,hyper=info,reqwest=info"
    } else {
        "info"
    };
    let logs = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Command::Status { json } => commands::status(&ctx, json),
        Command::Run(args) => commands::run(&ctx, args).await,
        Command::Daemon => commands::daemon(&ctx).await,
        Command::Request(cmd) => commands::request::handle(&ctx, cmd),
        Command::Member(cmd) => commands::member::handle(&ctx, cmd),
        Command::History(cmd) => commands::history::handle(&ctx, cmd),
        Command::Config(cmd) => commands::config(&ctx, cmd),
    }
}
