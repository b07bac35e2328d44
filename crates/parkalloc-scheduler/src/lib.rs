//! # ParkAlloc Scheduler
//!
//! Drives the once-per-day allocation run.
//!
//! ## Features:
//! - **Controller**: target date, idempotent run, atomic commit, notify
//! - **Run lock**: `run-<date>.lock` keeps concurrent invokers apart
//! - **Cron**: "30 7 * * 1-5" style schedules in local time
//! - **Daily ticker**: tokio interval loop for `parkalloc daemon`

pub mod controller;
pub mod cron;
pub mod daily;
pub mod lock;

pub use controller::{DayState, RunController, RunOptions, RunOutcome};
pub use cron::CronSchedule;
pub use daily::{DailyTicker, log_outcome, spawn_daily};
pub use lock::RunLock;
