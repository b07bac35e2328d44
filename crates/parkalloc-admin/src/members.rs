//! Member records. Renames cascade to requests, guest sponsors and History.

use chrono::NaiveDateTime;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::model::Member;

use crate::Desk;
use crate::forms::{MemberReport, MemberUpdate, required};

impl Desk {
    pub fn members(&self) -> Result<Vec<Member>> {
        self.store.members()
    }

    pub fn add_member(&self, member: Member) -> Result<Member> {
        let name = required("member name", &member.name)?;
        let mut members = self.store.members()?;
        if members.iter().any(|m| m.name == name) {
            return Err(ParkError::AlreadyExists(format!("member '{name}'")));
        }
        let member = Member { name, ..member };
        members.push(member.clone());
        self.store.save_members(&members)?;
        tracing::info!("👤 Member added: {} ({})", member.name, member.vehicle_class);
        Ok(member)
    }

    /// Edit a member. A new name or vehicle class is carried into pending
    /// staff requests, guest sponsor names and every History placement, all
    /// in one write.
    pub fn update_member(&self, old_name: &str, update: MemberUpdate) -> Result<Member> {
        let mut members = self.store.members()?;
        let new_name = match &update.name {
            Some(n) => required("member name", n)?,
            None => old_name.to_string(),
        };
        if new_name != old_name && members.iter().any(|m| m.name == new_name) {
            return Err(ParkError::AlreadyExists(format!("member '{new_name}'")));
        }
        let Some(member) = members.iter_mut().find(|m| m.name == old_name) else {
            return Err(ParkError::UnknownMember(old_name.to_string()));
        };

        let class_changed = update
            .vehicle_class
            .is_some_and(|c| c != member.vehicle_class);
        member.name = new_name.clone();
        if let Some(class) = update.vehicle_class {
            member.vehicle_class = class;
        }
        if let Some(plate) = update.plate {
            member.plate = non_empty(plate);
        }
        if let Some(detail) = update.vehicle_detail {
            member.vehicle_detail = non_empty(detail);
        }
        let updated = member.clone();

        if new_name == old_name && !class_changed {
            self.store.save_members(&members)?;
            return Ok(updated);
        }

        let mut batch = self.store.requests()?;
        for request in &mut batch.staff_requests {
            if request.member_name == old_name {
                request.member_name = new_name.clone();
            }
        }
        for guest in &mut batch.guest_requests {
            if guest.sponsor_member_name == old_name {
                guest.sponsor_member_name = new_name.clone();
            }
        }

        let mut history = self.store.history()?;
        let mut touched = 0;
        for record in &mut history {
            for placement in record.placements_mut() {
                if placement.rename_member(old_name, &new_name, updated.vehicle_class) {
                    touched += 1;
                }
            }
        }

        self.store.commit_all(&members, &batch, &history)?;
        tracing::info!(
            "✏️ Member '{old_name}' -> '{new_name}' ({}), {touched} history entries updated",
            updated.vehicle_class
        );
        Ok(updated)
    }

    /// Delete a member and withdraw any pending request of theirs.
    pub fn remove_member(&self, name: &str, now: NaiveDateTime) -> Result<Member> {
        let mut members = self.store.members()?;
        let Some(pos) = members.iter().position(|m| m.name == name) else {
            return Err(ParkError::UnknownMember(name.to_string()));
        };
        let removed = members.remove(pos);

        let mut batch = self.current_batch(now)?;
        let before = batch.staff_requests.len();
        batch.staff_requests.retain(|r| r.member_name != name);
        let history = self.store.history()?;
        if batch.staff_requests.len() != before {
            self.store.commit_all(&members, &batch, &history)?;
        } else {
            self.store.save_members(&members)?;
        }
        tracing::info!("🗑️ Member removed: {name}");
        Ok(removed)
    }

    /// Members with the newest date each one parked, read from History.
    pub fn member_report(&self) -> Result<Vec<MemberReport>> {
        let members = self.store.members()?;
        let history = self.store.history()?;
        Ok(members
            .into_iter()
            .map(|m| {
                let last_parked = history
                    .iter()
                    .filter(|r| r.parked(&m.name))
                    .map(|r| r.date)
                    .max();
                MemberReport {
                    name: m.name,
                    vehicle_class: m.vehicle_class,
                    plate: m.plate,
                    vehicle_detail: m.vehicle_detail,
                    last_parked,
                }
            })
            .collect())
    }
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
