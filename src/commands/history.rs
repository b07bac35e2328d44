//! `parkalloc history ...`

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use parkalloc_admin::DateRange;
use parkalloc_core::calendar::weekday_name;
use parkalloc_core::model::Placement;

use super::Context;

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List records, newest first.
    List {
        /// First date to include (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },

    /// Add a manual record; fails if the date already has one.
    Add(RecordArgs),

    /// Create or overwrite the record for a date.
    Replace(RecordArgs),

    /// Delete the record for a date.
    Remove { date: NaiveDate },
}

#[derive(Args)]
pub struct RecordArgs {
    date: NaiveDate,

    /// Members in pool A, comma separated.
    #[arg(long = "pool-a", value_delimiter = ',')]
    pool_a: Vec<String>,

    /// Members in pool B, comma separated.
    #[arg(long = "pool-b", value_delimiter = ',')]
    pool_b: Vec<String>,

    /// Waitlisted members, comma separated.
    #[arg(long, value_delimiter = ',')]
    waitlist: Vec<String>,
}

pub fn handle(ctx: &Context, cmd: HistoryCommand) -> Result<()> {
    let desk = ctx.desk()?;
    match cmd {
        HistoryCommand::List { from, to, json } => {
            let records = desk.history(DateRange { from, to })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
                return Ok(());
            }
            let names = &ctx.config.notify;
            for r in &records {
                println!("📅 {} ({})", r.date, weekday_name(r.date));
                println!("   {}: {}", names.pool_a_name, join(&r.pool_a));
                println!("   {}: {}", names.pool_b_name, join(&r.pool_b));
                if !r.waitlist.is_empty() {
                    println!("   Waitlist: {}", join(&r.waitlist));
                }
            }
            if records.is_empty() {
                println!("(no records)");
            }
        }
        HistoryCommand::Add(args) => {
            let record = desk.manual_record(args.date, &args.pool_a, &args.pool_b, &args.waitlist)?;
            desk.add_record(record)?;
            println!("📝 Added history for {}", args.date);
        }
        HistoryCommand::Replace(args) => {
            let record = desk.manual_record(args.date, &args.pool_a, &args.pool_b, &args.waitlist)?;
            desk.replace_record(record)?;
            println!("📝 Replaced history for {}", args.date);
        }
        HistoryCommand::Remove { date } => {
            desk.remove_record(date)?;
            println!("🗑️ Removed history for {date}");
        }
    }
    Ok(())
}

fn join(list: &[Placement]) -> String {
    if list.is_empty() {
        return "-".into();
    }
    list.iter().map(Placement::label).collect::<Vec<_>>().join(", ")
}
