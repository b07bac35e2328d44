//! `parkalloc member ...`

use anyhow::Result;
use clap::Subcommand;
use parkalloc_admin::MemberUpdate;
use parkalloc_core::model::{Member, VehicleClass};

use super::Context;

#[derive(Subcommand)]
pub enum MemberCommand {
    /// Register a staff member.
    Add {
        name: String,
        #[arg(long, default_value = "COMPACT")]
        vehicle: VehicleClass,
        #[arg(long)]
        plate: Option<String>,
        /// Model or colour, free text.
        #[arg(long)]
        detail: Option<String>,
    },

    /// Edit a member; a rename carries over to requests and history.
    Edit {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        vehicle: Option<VehicleClass>,
        /// New plate ("" clears it).
        #[arg(long)]
        plate: Option<String>,
        #[arg(long)]
        detail: Option<String>,
    },

    /// Delete a member and any pending request.
    Remove { name: String },

    /// List members with their last parking date.
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn handle(ctx: &Context, cmd: MemberCommand) -> Result<()> {
    let desk = ctx.desk()?;
    match cmd {
        MemberCommand::Add {
            name,
            vehicle,
            plate,
            detail,
        } => {
            let member = desk.add_member(Member {
                plate,
                vehicle_detail: detail,
                ..Member::new(&name, vehicle)
            })?;
            println!("✅ Added {} ({})", member.name, member.vehicle_class);
        }
        MemberCommand::Edit {
            name,
            rename,
            vehicle,
            plate,
            detail,
        } => {
            let member = desk.update_member(
                &name,
                MemberUpdate {
                    name: rename,
                    vehicle_class: vehicle,
                    plate,
                    vehicle_detail: detail,
                },
            )?;
            println!("✏️ Updated {} ({})", member.name, member.vehicle_class);
        }
        MemberCommand::Remove { name } => {
            let now = desk.calendar().local_now();
            desk.remove_member(&name, now)?;
            println!("🗑️ Removed {name}");
        }
        MemberCommand::List { json } => {
            let report = desk.member_report()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            println!("👥 {} members", report.len());
            for m in &report {
                let last = m
                    .last_parked
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "never".into());
                println!(
                    "   • {:<12} {:<8} {:<12} last parked: {last}",
                    m.name,
                    m.vehicle_class.as_str(),
                    m.plate.as_deref().unwrap_or("-"),
                );
            }
        }
    }
    Ok(())
}
