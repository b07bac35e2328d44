//! # ParkAlloc Admin
//!
//! The [`Desk`] is the one entry point for everything a person does between
//! runs: staff and guest requests, member records, history corrections.
//! Every call takes `now` explicitly; there is no session state.

pub mod forms;
mod history;
mod intake;
mod members;

pub use forms::{DateRange, GuestForm, MemberReport, MemberUpdate};

use parkalloc_core::calendar::OperatingCalendar;
use parkalloc_core::config::ParkConfig;
use parkalloc_core::error::Result;
use parkalloc_store::RecordStore;

pub struct Desk {
    store: RecordStore,
    calendar: OperatingCalendar,
}

impl Desk {
    pub fn new(store: RecordStore, config: &ParkConfig) -> Result<Self> {
        Ok(Self {
            store,
            calendar: OperatingCalendar::from_config(&config.schedule)?,
        })
    }

    pub fn calendar(&self) -> &OperatingCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}
