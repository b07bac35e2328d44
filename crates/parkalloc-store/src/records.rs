//! Typed access to the three documents.
//!
//! Loads never fail on bad data: a missing document is the first run, a
//! corrupt one is logged and replaced by the typed default. Backend IO
//! errors still propagate so a run can abort before writing anything.

use parkalloc_core::error::Result;
use parkalloc_core::model::{AllocationRecord, Member, RequestBatch};
use parkalloc_core::traits::{DocumentBackend, Entity};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub struct RecordStore {
    backend: Box<dyn DocumentBackend>,
}

impl RecordStore {
    pub fn new(backend: Box<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Load a document, substituting `T::default()` when missing or unreadable.
    pub fn load<T: DeserializeOwned + Default>(&self, entity: Entity) -> Result<T> {
        let Some(bytes) = self.backend.read(entity)? else {
            return Ok(T::default());
        };
        let body = match String::from_utf8(bytes) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("⚠️ {entity} document is not valid UTF-8, using default: {e}");
                return Ok(T::default());
            }
        };
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!("⚠️ Failed to parse {entity} document, using default: {e}");
                Ok(T::default())
            }
        }
    }

    pub fn save<T: Serialize>(&self, entity: Entity, value: &T) -> Result<()> {
        let body = serde_json::to_string_pretty(value)?;
        self.backend.write(entity, &body)
    }

    pub fn members(&self) -> Result<Vec<Member>> {
        self.load(Entity::Members)
    }

    pub fn requests(&self) -> Result<RequestBatch> {
        self.load(Entity::Requests)
    }

    pub fn history(&self) -> Result<Vec<AllocationRecord>> {
        self.load(Entity::History)
    }

    pub fn save_members(&self, members: &[Member]) -> Result<()> {
        self.save(Entity::Members, &members)
    }

    pub fn save_requests(&self, batch: &RequestBatch) -> Result<()> {
        self.save(Entity::Requests, batch)
    }

    pub fn save_history(&self, history: &[AllocationRecord]) -> Result<()> {
        self.save(Entity::History, &history)
    }

    /// Write several documents so that either all or none become visible.
    /// Serialization happens before any write.
    pub fn save_all(&self, docs: &[(Entity, serde_json::Value)]) -> Result<()> {
        let bodies = docs
            .iter()
            .map(|(entity, value)| Ok((*entity, serde_json::to_string_pretty(value)?)))
            .collect::<Result<Vec<_>>>()?;
        self.backend.write_all(&bodies)
    }

    /// Persist the outcome of an allocation run: fairness updates and the
    /// new History go out together.
    pub fn commit_run(&self, members: &[Member], history: &[AllocationRecord]) -> Result<()> {
        self.save_all(&[
            (Entity::Members, serde_json::to_value(members)?),
            (Entity::History, serde_json::to_value(history)?),
        ])
    }

    /// Write members, requests and history together (member renames).
    pub fn commit_all(
        &self,
        members: &[Member],
        batch: &RequestBatch,
        history: &[AllocationRecord],
    ) -> Result<()> {
        self.save_all(&[
            (Entity::Members, serde_json::to_value(members)?),
            (Entity::Requests, serde_json::to_value(batch)?),
            (Entity::History, serde_json::to_value(history)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonFileBackend, SqliteBackend};
    use chrono::{NaiveDate, NaiveTime};
    use parkalloc_core::model::{Guest, ParkingPreference, Placement, StaffRequest, VehicleClass};
    use std::path::PathBuf;

    fn sample_members() -> Vec<Member> {
        let mut kim = Member::new("Kim", VehicleClass::Compact);
        kim.plate = Some("12가 3456".into());
        kim.last_allocated_date = NaiveDate::from_ymd_opt(2026, 10, 16);
        vec![kim, Member::new("Lee", VehicleClass::Large)]
    }

    fn sample_batch() -> RequestBatch {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let ts = date.pred_opt().unwrap().and_hms_opt(9, 1, 0).unwrap();
        RequestBatch {
            target_date: Some(date),
            staff_requests: vec![StaffRequest::new("Kim", ts)],
            guest_requests: vec![Guest {
                display_name: "Visitor".into(),
                vehicle_class: VehicleClass::Compact,
                parking_preference: ParkingPreference::Either,
                purpose: "Interview".into(),
                sponsor_member_name: "Lee".into(),
                submitted_at: Some(ts),
            }],
            pool_b_reduced: true,
        }
    }

    fn sample_history() -> Vec<AllocationRecord> {
        let mut record = AllocationRecord::empty(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        record.pool_b.push(Placement::member(
            "Kim",
            VehicleClass::Compact,
            NaiveTime::from_hms_opt(9, 1, 0),
        ));
        vec![record]
    }

    fn roundtrip(store: &RecordStore) {
        store.save_members(&sample_members()).unwrap();
        store.save_requests(&sample_batch()).unwrap();
        store.save_history(&sample_history()).unwrap();
        assert_eq!(store.members().unwrap(), sample_members());
        assert_eq!(store.requests().unwrap(), sample_batch());
        assert_eq!(store.history().unwrap(), sample_history());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        roundtrip(&store);
    }

    #[test]
    fn test_sqlite_roundtrip() {
        let store = RecordStore::new(Box::new(
            SqliteBackend::open(&PathBuf::from(":memory:")).unwrap(),
        ));
        roundtrip(&store);
    }

    #[test]
    fn test_missing_documents_load_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        assert!(store.members().unwrap().is_empty());
        assert!(store.history().unwrap().is_empty());
        assert_eq!(store.requests().unwrap(), RequestBatch::default());
    }

    #[test]
    fn test_corrupt_document_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("history.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("requests.json"), "").unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        assert!(store.history().unwrap().is_empty());
        assert_eq!(store.requests().unwrap(), RequestBatch::default());
    }

    #[test]
    fn test_commit_run_writes_both() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        store.commit_run(&sample_members(), &sample_history()).unwrap();
        assert_eq!(store.members().unwrap().len(), 2);
        assert_eq!(store.history().unwrap().len(), 1);
    }

    #[test]
    fn test_reads_legacy_documents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("members.json"),
            r#"[{"name": "Kim", "car_type": "SUV", "car_number": "", "car_details": "", "last_parked_date": null}]"#,
        )
        .unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        let members = store.members().unwrap();
        assert_eq!(members[0].vehicle_class, VehicleClass::Large);
    }

    #[test]
    fn test_invalid_utf8_document_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("members.json"), [0xff, 0xfe, 0x5b, 0x5d]).unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        assert!(store.members().unwrap().is_empty());
    }

    #[test]
    fn test_failed_commit_run_keeps_members_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(Box::new(JsonFileBackend::new(dir.path()).unwrap()));
        store.save_members(&sample_members()).unwrap();
        store.save_history(&sample_history()).unwrap();
        std::fs::create_dir(dir.path().join(".history.json.tmp")).unwrap();

        let mut members = sample_members();
        members[1].last_allocated_date = NaiveDate::from_ymd_opt(2026, 10, 20);
        let mut history = sample_history();
        history.push(AllocationRecord::empty(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()));

        assert!(store.commit_run(&members, &history).is_err());
        assert_eq!(store.members().unwrap(), sample_members());
        assert_eq!(store.history().unwrap(), sample_history());
    }
}
