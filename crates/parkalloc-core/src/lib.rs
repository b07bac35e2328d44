//! # ParkAlloc Core
//!
//! Shared building blocks for the parking allocation workspace:
//! domain model, configuration, calendar rules, error type and the
//! traits that the storage and notification crates implement.
//!
//! ## Layout
//! ```text
//! parkalloc-core
//!   ├── model     Member, RequestBatch, Guest, Placement, AllocationRecord
//!   ├── calendar  target date derivation (cutoff + non-operating days)
//!   ├── config    ~/.parkalloc/config.toml
//!   ├── error     ParkError + Result
//!   └── traits    DocumentBackend, Notifier
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod model;
pub mod traits;

pub use config::ParkConfig;
pub use error::{ParkError, Result};
pub use model::{
    AllocationRecord, Capacities, Guest, Member, ParkingPreference, Placement, RequestBatch,
    StaffRequest, VehicleClass,
};
