//! Daily ticker: sleeps on a tokio interval and fires the controller when
//! the cron schedule comes due.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use parkalloc_core::config::ScheduleConfig;
use parkalloc_core::error::Result;
use parkalloc_core::traits::DeliveryStatus;
use tokio::sync::Mutex;

use crate::controller::{RunController, RunOptions, RunOutcome};
use crate::cron::CronSchedule;

/// Remembers the last check so each cron slot fires once.
#[derive(Debug, Clone)]
pub struct DailyTicker {
    cron: CronSchedule,
    last_check: NaiveDateTime,
}

impl DailyTicker {
    pub fn new(cron: CronSchedule, started: NaiveDateTime) -> Self {
        Self {
            cron,
            last_check: started,
        }
    }

    /// True when a fire time passed since the previous call.
    pub fn due(&mut self, now: NaiveDateTime) -> bool {
        let due = self.cron.is_due(self.last_check, now);
        self.last_check = now;
        due
    }

    pub fn next_fire(&self) -> Option<NaiveDateTime> {
        self.cron.next_after(self.last_check)
    }
}

/// Run forever, triggering one allocation run per cron slot.
/// Only returns if the schedule itself is invalid.
pub async fn spawn_daily(controller: Arc<Mutex<RunController>>, schedule: &ScheduleConfig) -> Result<()> {
    let cron = CronSchedule::parse(&schedule.cron)?;
    let calendar = controller.lock().await.calendar().clone();
    let mut ticker = DailyTicker::new(cron, calendar.local_now());

    tracing::info!(
        "⏰ Daily scheduler started (cron '{}', check every {}s, next {:?})",
        schedule.cron,
        schedule.check_interval_secs,
        ticker.next_fire()
    );

    let mut interval = tokio::time::interval(Duration::from_secs(schedule.check_interval_secs.max(1)));
    loop {
        interval.tick().await;
        let now = calendar.local_now();
        if !ticker.due(now) {
            continue;
        }

        let result = {
            let mut ctl = controller.lock().await;
            ctl.run(now, RunOptions::default()).await
        };
        match result {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => tracing::error!("❌ Daily run failed: {e}"),
        }
    }
}

pub fn log_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::AlreadyAllocated { date } => tracing::info!("✅ {date}: already allocated"),
        RunOutcome::NoRequests { date } => tracing::info!("📭 {date}: no requests"),
        RunOutcome::Busy { date } => tracing::info!("⏳ {date}: run in progress elsewhere"),
        RunOutcome::Allocated { record, delivery, .. } => match delivery {
            DeliveryStatus::Sent => tracing::info!("📣 {}: allocated and notified", record.date),
            DeliveryStatus::Skipped => tracing::info!("🔕 {}: allocated, notification skipped", record.date),
            DeliveryStatus::NotConfigured(reason) => {
                tracing::error!("❌ {}: allocated, notifier not configured: {reason}", record.date)
            }
            DeliveryStatus::Failed(reason) => {
                tracing::warn!("⚠️ {}: allocated, notification failed: {reason}", record.date)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_fires_once_per_slot() {
        let cron = CronSchedule::parse("30 7 * * *").unwrap();
        let mut ticker = DailyTicker::new(cron, at(7, 0));
        assert_eq!(ticker.next_fire(), Some(at(7, 30)));
        assert!(!ticker.due(at(7, 29)));
        assert!(ticker.due(at(7, 31)));
        assert!(!ticker.due(at(7, 32)));
    }

    #[test]
    fn test_not_due_when_started_after_slot() {
        let cron = CronSchedule::parse("30 7 * * *").unwrap();
        let mut ticker = DailyTicker::new(cron, at(7, 45));
        assert!(!ticker.due(at(9, 0)));
    }
}
