//! Staff and guest requests against the active batch.

use chrono::NaiveDateTime;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::model::{Guest, RequestBatch, StaffRequest};

use crate::Desk;
use crate::forms::GuestForm;

impl Desk {
    /// The batch for the target date of `now`. A batch left over from an
    /// earlier date is replaced by an empty one and the reset is saved.
    pub fn current_batch(&self, now: NaiveDateTime) -> Result<RequestBatch> {
        let date = self.calendar.target_date(now);
        let batch = self.store.requests()?;
        if batch.is_for(date) {
            return Ok(batch);
        }
        tracing::info!(
            "🔄 Request batch reset: {:?} -> {date} ({} staff, {} guests dropped)",
            batch.target_date,
            batch.staff_requests.len(),
            batch.guest_requests.len()
        );
        let fresh = RequestBatch::for_date(date);
        self.store.save_requests(&fresh)?;
        Ok(fresh)
    }

    /// Like [`Desk::current_batch`] but read-only: a stale batch comes back
    /// empty and the stored document is left alone.
    pub fn peek_batch(&self, now: NaiveDateTime) -> Result<RequestBatch> {
        let date = self.calendar.target_date(now);
        let batch = self.store.requests()?;
        if batch.is_for(date) {
            Ok(batch)
        } else {
            Ok(RequestBatch::for_date(date))
        }
    }

    pub fn request_staff(&self, name: &str, now: NaiveDateTime) -> Result<StaffRequest> {
        let name = name.trim();
        if !self.store.members()?.iter().any(|m| m.name == name) {
            return Err(ParkError::UnknownMember(name.to_string()));
        }
        let mut batch = self.current_batch(now)?;
        if batch.has_staff_request(name) {
            return Err(ParkError::AlreadyExists(format!(
                "{name} has already requested a slot"
            )));
        }
        let request = StaffRequest::new(name, now);
        batch.staff_requests.push(request.clone());
        self.store.save_requests(&batch)?;
        tracing::info!("🙋 Staff request: {name}");
        Ok(request)
    }

    pub fn request_guest(&self, form: GuestForm, now: NaiveDateTime) -> Result<Guest> {
        let form = form.validated()?;
        let mut batch = self.current_batch(now)?;
        let guest = Guest {
            display_name: form.display_name,
            vehicle_class: form.vehicle_class,
            parking_preference: form.parking_preference,
            purpose: form.purpose,
            sponsor_member_name: form.sponsor_member_name,
            submitted_at: Some(now),
        };
        batch.guest_requests.push(guest.clone());
        self.store.save_requests(&batch)?;
        tracing::info!(
            "🎫 Guest request: {} ({}, {}) for {}",
            guest.display_name,
            guest.vehicle_class,
            guest.parking_preference,
            guest.sponsor_member_name
        );
        Ok(guest)
    }

    pub fn withdraw_staff(&self, name: &str, now: NaiveDateTime) -> Result<()> {
        let mut batch = self.current_batch(now)?;
        let before = batch.staff_requests.len();
        batch.staff_requests.retain(|r| r.member_name != name);
        if batch.staff_requests.len() == before {
            return Err(ParkError::NotFound(format!("no pending request for {name}")));
        }
        self.store.save_requests(&batch)?;
        tracing::info!("↩️ Staff request withdrawn: {name}");
        Ok(())
    }

    /// Remove the guest at `index` (submission order, 0-based).
    pub fn remove_guest(&self, index: usize, now: NaiveDateTime) -> Result<Guest> {
        let mut batch = self.current_batch(now)?;
        if index >= batch.guest_requests.len() {
            return Err(ParkError::NotFound(format!("no guest at index {index}")));
        }
        let guest = batch.guest_requests.remove(index);
        self.store.save_requests(&batch)?;
        tracing::info!("🗑️ Guest removed: {}", guest.display_name);
        Ok(guest)
    }

    /// Administrative edit of a guest. The original submission time stays.
    pub fn update_guest(&self, index: usize, form: GuestForm, now: NaiveDateTime) -> Result<Guest> {
        let form = form.validated()?;
        let mut batch = self.current_batch(now)?;
        let Some(slot) = batch.guest_requests.get_mut(index) else {
            return Err(ParkError::NotFound(format!("no guest at index {index}")));
        };
        *slot = Guest {
            display_name: form.display_name,
            vehicle_class: form.vehicle_class,
            parking_preference: form.parking_preference,
            purpose: form.purpose,
            sponsor_member_name: form.sponsor_member_name,
            submitted_at: slot.submitted_at,
        };
        let guest = slot.clone();
        self.store.save_requests(&batch)?;
        Ok(guest)
    }

    pub fn reset_requests(&self, now: NaiveDateTime) -> Result<()> {
        let date = self.calendar.target_date(now);
        self.store.save_requests(&RequestBatch::for_date(date))?;
        tracing::info!("🧹 Requests cleared for {date}");
        Ok(())
    }

    /// Flip the extra pool B slot for the target date. Returns the new value.
    pub fn toggle_pool_b(&self, now: NaiveDateTime) -> Result<bool> {
        let mut batch = self.current_batch(now)?;
        batch.pool_b_reduced = !batch.pool_b_reduced;
        self.store.save_requests(&batch)?;
        tracing::info!("🔀 Pool B extra slot: {}", batch.pool_b_reduced);
        Ok(batch.pool_b_reduced)
    }
}
