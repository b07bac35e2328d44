//! Seams implemented by the storage and notification crates.

pub mod backend;
pub mod notifier;

pub use backend::{DocumentBackend, Entity};
pub use notifier::{DeliveryStatus, Notifier};
