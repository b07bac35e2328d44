//! Subcommand handlers.

pub mod history;
pub mod member;
pub mod request;

pub use history::HistoryCommand;
pub use member::MemberCommand;
pub use request::RequestCommand;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Subcommand};
use parkalloc_admin::{DateRange, Desk};
use parkalloc_core::ParkConfig;
use parkalloc_core::calendar::weekday_name;
use parkalloc_core::model::{AllocationRecord, Capacities};
use parkalloc_notify::summarize;
use parkalloc_scheduler::{RunController, RunOptions, RunOutcome, log_outcome, spawn_daily};
use parkalloc_store::{RecordStore, open_backend};

/// Loaded configuration plus where it came from.
pub struct Context {
    pub config: ParkConfig,
    pub config_path: PathBuf,
}

impl Context {
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let config_path = ParkConfig::resolve_path(explicit);
        let config = ParkConfig::load_or_default(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn store(&self) -> Result<RecordStore> {
        let dir = self.config.data_dir();
        let backend = open_backend(&self.config.storage, &dir)
            .with_context(|| format!("opening {} store in {}", self.config.storage.backend, dir.display()))?;
        Ok(RecordStore::new(backend))
    }

    pub fn desk(&self) -> Result<Desk> {
        Ok(Desk::new(self.store()?, &self.config)?)
    }

    pub fn controller(&self) -> Result<RunController> {
        let mut ctl = RunController::new(self.store()?, &self.config)?
            .with_lock_dir(self.config.data_dir());
        if let Some(notifier) = parkalloc_notify::notifier_from_config(&self.config.notify)? {
            ctl = ctl.with_notifier(notifier);
        }
        Ok(ctl)
    }
}

// ─── status ────────────────────────────────────────────

pub fn status(ctx: &Context, json: bool) -> Result<()> {
    let desk = ctx.desk()?;
    let now = desk.calendar().local_now();
    let batch = desk.peek_batch(now)?;
    let date = desk.calendar().target_date(now);
    let done = !desk
        .history(DateRange {
            from: Some(date),
            to: Some(date),
        })?
        .is_empty();
    let capacities = Capacities::for_batch(&ctx.config.capacity, &batch);

    if json {
        let out = serde_json::json!({
            "target_date": date,
            "utc_offset": desk.calendar().offset().to_string(),
            "backend": desk.store().backend_name(),
            "allocated": done,
            "capacities": capacities,
            "requests": batch,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let names = &ctx.config.notify;
    println!(
        "📅 Target date: {date} ({}, UTC{})",
        weekday_name(date),
        desk.calendar().offset()
    );
    println!("   State:       {}", if done { "allocated" } else { "pending" });
    println!("   Storage:     {}", desk.store().backend_name());
    println!(
        "🅿️ Capacity:    {} {}, {} {}{}",
        names.pool_a_name,
        capacities.pool_a,
        names.pool_b_name,
        capacities.pool_b,
        if batch.pool_b_reduced { " (extra slot on)" } else { "" }
    );

    println!("\n🙋 Staff requests ({}):", batch.staff_requests.len());
    for r in &batch.staff_requests {
        let at = r
            .submitted_at
            .map(|t| t.format("%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "manual".into());
        println!("   • {} ({at})", r.member_name);
    }

    println!("\n🎫 Guests ({}):", batch.guest_requests.len());
    for (i, g) in batch.guest_requests.iter().enumerate() {
        println!(
            "   [{i}] {} ({}, {}) for {}: {}",
            g.display_name, g.vehicle_class, g.parking_preference, g.sponsor_member_name, g.purpose
        );
    }
    Ok(())
}

// ─── run / daemon ──────────────────────────────────────

#[derive(Args)]
pub struct RunArgs {
    /// Compute and print the allocation without saving or notifying.
    #[arg(long)]
    dry_run: bool,

    /// Save the allocation but skip the notification.
    #[arg(long)]
    no_notify: bool,

    /// Pretend the current time is this RFC 3339 timestamp.
    #[arg(long, value_name = "RFC3339")]
    at: Option<DateTime<FixedOffset>>,
}

pub async fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let mut ctl = ctx.controller()?;
    let now_utc = args.at.map(|t| t.with_timezone(&Utc)).unwrap_or_else(Utc::now);
    let now = ctl.calendar().local(now_utc);
    let options = RunOptions {
        dry_run: args.dry_run,
        notify: !args.no_notify,
    };

    let outcome = ctl.run(now, options).await?;
    log_outcome(&outcome);
    if let RunOutcome::Allocated {
        record, capacities, ..
    } = &outcome
    {
        print_summary(ctx, record, *capacities);
    }
    Ok(())
}

fn print_summary(ctx: &Context, record: &AllocationRecord, capacities: Capacities) {
    let summary = summarize(record, capacities, &ctx.config.notify);
    println!("{}\n\n{}", summary.title, summary.body);
}

pub async fn daemon(ctx: &Context) -> Result<()> {
    let controller = Arc::new(tokio::sync::Mutex::new(ctx.controller()?));
    tokio::select! {
        result = spawn_daily(controller, &ctx.config.schedule) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("👋 Shutting down"),
    }
    Ok(())
}

// ─── config ────────────────────────────────────────────

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,

    /// Write a config file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn config(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("# {}", ctx.config_path.display());
            println!("{}", toml::to_string_pretty(&ctx.config)?);
        }
        ConfigCommand::Init { force } => {
            if ctx.config_path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    ctx.config_path.display()
                );
            }
            ParkConfig::default().save_to(&ctx.config_path)?;
            println!("✅ Wrote {}", ctx.config_path.display());
        }
    }
    Ok(())
}
