//! Daily Run Controller: decides whether a date is due, runs the allocator
//! once, commits the outcome and hands it to the notifier.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use parkalloc_allocator::{allocate_batch, apply_fairness};
use parkalloc_core::calendar::OperatingCalendar;
use parkalloc_core::config::{CapacityConfig, NotifyConfig, ParkConfig};
use parkalloc_core::error::Result;
use parkalloc_core::model::{AllocationRecord, Capacities, RequestBatch};
use parkalloc_core::traits::{DeliveryStatus, Notifier};
use parkalloc_notify::summarize;
use parkalloc_store::RecordStore;
use serde::Serialize;

use crate::lock::RunLock;

/// Per-date state. A date is `Done` once History holds its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayState {
    Pending,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Compute and report without persisting or notifying.
    pub dry_run: bool,
    pub notify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            notify: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    AlreadyAllocated {
        date: NaiveDate,
    },
    NoRequests {
        date: NaiveDate,
    },
    /// Another invoker holds the run lock for this date.
    Busy {
        date: NaiveDate,
    },
    Allocated {
        record: AllocationRecord,
        capacities: Capacities,
        delivery: DeliveryStatus,
        /// `false` for dry runs.
        persisted: bool,
    },
}

impl RunOutcome {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::AlreadyAllocated { date } | Self::NoRequests { date } | Self::Busy { date } => {
                *date
            }
            Self::Allocated { record, .. } => record.date,
        }
    }
}

pub struct RunController {
    store: RecordStore,
    calendar: OperatingCalendar,
    capacity: CapacityConfig,
    notify: NotifyConfig,
    notifier: Option<Box<dyn Notifier>>,
    lock_dir: Option<PathBuf>,
}

impl RunController {
    pub fn new(store: RecordStore, config: &ParkConfig) -> Result<Self> {
        Ok(Self {
            store,
            calendar: OperatingCalendar::from_config(&config.schedule)?,
            capacity: config.capacity.clone(),
            notify: config.notify.clone(),
            notifier: None,
            lock_dir: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Guard runs with `run-<date>.lock` files in `dir`.
    pub fn with_lock_dir(mut self, dir: PathBuf) -> Self {
        self.lock_dir = Some(dir);
        self
    }

    pub fn calendar(&self) -> &OperatingCalendar {
        &self.calendar
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn day_state(&self, date: NaiveDate) -> Result<DayState> {
        let done = self.store.history()?.iter().any(|r| r.date == date);
        Ok(if done { DayState::Done } else { DayState::Pending })
    }

    /// One daily run for the target date of `now` (local wall-clock time).
    pub async fn run(&mut self, now: NaiveDateTime, options: RunOptions) -> Result<RunOutcome> {
        let date = self.calendar.target_date(now);

        let _lock = match (&self.lock_dir, options.dry_run) {
            (Some(dir), false) => match RunLock::acquire(dir, date)? {
                Some(lock) => Some(lock),
                None => {
                    tracing::info!("⏳ Run for {date} already in progress elsewhere");
                    return Ok(RunOutcome::Busy { date });
                }
            },
            _ => None,
        };

        let mut history = self.store.history()?;
        if history.iter().any(|r| r.date == date) {
            tracing::info!("✅ {date} already allocated, nothing to do");
            return Ok(RunOutcome::AlreadyAllocated { date });
        }

        let batch = self.store.requests()?;
        let batch = if batch.is_for(date) {
            batch
        } else {
            if !batch.is_empty() {
                tracing::warn!(
                    "⚠️ Ignoring stale request batch for {:?} (target is {date})",
                    batch.target_date
                );
            }
            RequestBatch::for_date(date)
        };
        if batch.is_empty() {
            tracing::info!("📭 No requests for {date}");
            return Ok(RunOutcome::NoRequests { date });
        }

        let mut members = self.store.members()?;
        let (allocation, capacities) = allocate_batch(&members, &batch, &self.capacity);
        let admitted: Vec<String> = allocation
            .admitted_members()
            .into_iter()
            .map(String::from)
            .collect();
        let record = allocation.into_record(date);

        if options.dry_run {
            tracing::info!("🧪 Dry run for {date}: nothing persisted");
            return Ok(RunOutcome::Allocated {
                record,
                capacities,
                delivery: DeliveryStatus::Skipped,
                persisted: false,
            });
        }

        let admitted: Vec<&str> = admitted.iter().map(String::as_str).collect();
        let stamped = apply_fairness(&mut members, &admitted, date);
        let pos = history.partition_point(|r| r.date < date);
        history.insert(pos, record.clone());
        self.store.commit_run(&members, &history)?;
        tracing::info!(
            "🅿️ Allocated {date}: A {}/{}, B {}/{}, waitlist {} ({stamped} members stamped)",
            record.pool_a.len(),
            capacities.pool_a,
            record.pool_b.len(),
            capacities.pool_b,
            record.waitlist.len()
        );

        let delivery = match self.notifier.as_deref() {
            Some(notifier) if options.notify => {
                let summary = summarize(&record, capacities, &self.notify);
                notifier.deliver(&summary.title, &summary.body).await
            }
            _ => DeliveryStatus::Skipped,
        };

        Ok(RunOutcome::Allocated {
            record,
            capacities,
            delivery,
            persisted: true,
        })
    }
}
