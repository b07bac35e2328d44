//! History corrections: list, manual add, replace, remove.

use chrono::NaiveDate;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::model::{AllocationRecord, Member, Placement};

use crate::Desk;
use crate::forms::DateRange;

impl Desk {
    /// Records in `range`, newest first.
    pub fn history(&self, range: DateRange) -> Result<Vec<AllocationRecord>> {
        let mut records: Vec<_> = self
            .store
            .history()?
            .into_iter()
            .filter(|r| range.contains(r.date))
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    /// Build a record from member names. Entries carry no time and render
    /// as `manual`.
    pub fn manual_record(
        &self,
        date: NaiveDate,
        pool_a: &[String],
        pool_b: &[String],
        waitlist: &[String],
    ) -> Result<AllocationRecord> {
        let members = self.store.members()?;
        let place = |names: &[String]| -> Result<Vec<Placement>> {
            names.iter().map(|n| manual_placement(&members, n)).collect()
        };
        Ok(AllocationRecord {
            date,
            pool_a: place(pool_a)?,
            pool_b: place(pool_b)?,
            waitlist: place(waitlist)?,
        })
    }

    /// Insert a record; the date must not have one yet.
    pub fn add_record(&self, record: AllocationRecord) -> Result<()> {
        let mut history = self.store.history()?;
        if history.iter().any(|r| r.date == record.date) {
            return Err(ParkError::AlreadyExists(format!(
                "history for {} (use replace to overwrite)",
                record.date
            )));
        }
        let date = record.date;
        insert_sorted(&mut history, record);
        self.store.save_history(&history)?;
        tracing::info!("📝 History added for {date}");
        Ok(())
    }

    /// Create or overwrite the record for its date.
    pub fn replace_record(&self, record: AllocationRecord) -> Result<()> {
        let mut history = self.store.history()?;
        let date = record.date;
        history.retain(|r| r.date != date);
        insert_sorted(&mut history, record);
        self.store.save_history(&history)?;
        tracing::info!("📝 History replaced for {date}");
        Ok(())
    }

    pub fn remove_record(&self, date: NaiveDate) -> Result<AllocationRecord> {
        let mut history = self.store.history()?;
        let Some(pos) = history.iter().position(|r| r.date == date) else {
            return Err(ParkError::NotFound(format!("no history for {date}")));
        };
        let removed = history.remove(pos);
        self.store.save_history(&history)?;
        tracing::info!("🗑️ History removed for {date}");
        Ok(removed)
    }
}

fn manual_placement(members: &[Member], name: &str) -> Result<Placement> {
    let name = name.trim();
    members
        .iter()
        .find(|m| m.name == name)
        .map(|m| Placement::member(&m.name, m.vehicle_class, None))
        .ok_or_else(|| ParkError::UnknownMember(name.to_string()))
}

fn insert_sorted(history: &mut Vec<AllocationRecord>, record: AllocationRecord) {
    let pos = history.partition_point(|r| r.date < record.date);
    history.insert(pos, record);
}
