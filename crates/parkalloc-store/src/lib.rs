//! # ParkAlloc Store
//!
//! Whole-document persistence for Members, Requests and History.
//!
//! - `JsonFileBackend`: one pretty JSON file per document, human-readable
//! - `SqliteBackend`: one row per document, multi-document writes in a transaction
//! - `RecordStore`: typed load/save on top of either backend; missing or
//!   corrupt documents load as defaults

pub mod json;
pub mod records;
pub mod sqlite;

pub use json::JsonFileBackend;
pub use records::RecordStore;
pub use sqlite::SqliteBackend;

use parkalloc_core::config::StorageConfig;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::traits::DocumentBackend;
use std::path::Path;

/// Open the backend named in config under `data_dir`.
pub fn open_backend(config: &StorageConfig, data_dir: &Path) -> Result<Box<dyn DocumentBackend>> {
    match config.backend.as_str() {
        "json" => Ok(Box::new(JsonFileBackend::new(data_dir)?)),
        "sqlite" => {
            std::fs::create_dir_all(data_dir)?;
            Ok(Box::new(SqliteBackend::open(&data_dir.join("parkalloc.db"))?))
        }
        other => Err(ParkError::Config(format!("unknown storage backend '{other}'"))),
    }
}
