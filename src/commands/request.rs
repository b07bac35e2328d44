//! `parkalloc request ...`

use anyhow::Result;
use clap::{Args, Subcommand};
use parkalloc_admin::GuestForm;
use parkalloc_core::model::{ParkingPreference, VehicleClass};

use super::Context;

#[derive(Subcommand)]
pub enum RequestCommand {
    /// Request a slot for a staff member.
    Staff { name: String },

    /// Register a guest.
    Guest(GuestArgs),

    /// Withdraw a staff request.
    Withdraw { name: String },

    /// Remove the guest at INDEX (see `parkalloc status`).
    RemoveGuest { index: usize },

    /// Replace the guest at INDEX, keeping its submission time.
    EditGuest {
        index: usize,
        #[command(flatten)]
        guest: GuestArgs,
    },

    /// Clear all requests for the target date.
    Reset,

    /// Turn the extra pool B slot on or off for the target date.
    TogglePoolB,
}

#[derive(Args)]
pub struct GuestArgs {
    /// Guest name.
    #[arg(long)]
    name: String,

    /// COMPACT or LARGE (SEDAN/SUV accepted).
    #[arg(long, default_value = "COMPACT")]
    vehicle: VehicleClass,

    /// POOL_A, POOL_B or EITHER.
    #[arg(long, default_value = "EITHER")]
    pool: ParkingPreference,

    /// Reason for the visit.
    #[arg(long)]
    purpose: String,

    /// Staff member hosting the guest.
    #[arg(long)]
    sponsor: String,
}

impl From<GuestArgs> for GuestForm {
    fn from(args: GuestArgs) -> Self {
        Self {
            display_name: args.name,
            vehicle_class: args.vehicle,
            parking_preference: args.pool,
            purpose: args.purpose,
            sponsor_member_name: args.sponsor,
        }
    }
}

pub fn handle(ctx: &Context, cmd: RequestCommand) -> Result<()> {
    let desk = ctx.desk()?;
    let now = desk.calendar().local_now();
    let date = desk.calendar().target_date(now);

    match cmd {
        RequestCommand::Staff { name } => {
            desk.request_staff(&name, now)?;
            println!("✅ {name} requested a slot for {date}");
        }
        RequestCommand::Guest(args) => {
            let guest = desk.request_guest(args.into(), now)?;
            println!(
                "✅ Guest {} ({}, {}) registered for {date}",
                guest.display_name, guest.vehicle_class, guest.parking_preference
            );
        }
        RequestCommand::Withdraw { name } => {
            desk.withdraw_staff(&name, now)?;
            println!("↩️ {name} withdrawn");
        }
        RequestCommand::RemoveGuest { index } => {
            let guest = desk.remove_guest(index, now)?;
            println!("🗑️ Guest {} removed", guest.display_name);
        }
        RequestCommand::EditGuest { index, guest } => {
            let guest = desk.update_guest(index, guest.into(), now)?;
            println!("✏️ Guest [{index}] is now {}", guest.display_name);
        }
        RequestCommand::Reset => {
            desk.reset_requests(now)?;
            println!("🧹 Requests cleared for {date}");
        }
        RequestCommand::TogglePoolB => {
            let on = desk.toggle_pool_b(now)?;
            println!("🔀 Extra pool B slot for {date}: {}", if on { "on" } else { "off" });
        }
    }
    Ok(())
}
