//! Target date rules.
//!
//! Before the daily cutoff the target is today, otherwise tomorrow; a target
//! on a non-operating day rolls forward to the next operating day.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc,
    Weekday,
};

use crate::config::ScheduleConfig;
use crate::error::{ParkError, Result};

/// Operating days, cutoff and local offset.
#[derive(Debug, Clone)]
pub struct OperatingCalendar {
    cutoff: NaiveTime,
    offset: FixedOffset,
    closed: Vec<Weekday>,
}

impl OperatingCalendar {
    pub fn new(cutoff: NaiveTime, offset: FixedOffset, closed: Vec<Weekday>) -> Result<Self> {
        if closed.len() >= 7 {
            return Err(ParkError::Config(
                "at least one operating day is required".into(),
            ));
        }
        Ok(Self {
            cutoff,
            offset,
            closed,
        })
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        let cutoff = NaiveTime::parse_from_str(&config.cutoff, "%H:%M")
            .map_err(|e| ParkError::Config(format!("invalid cutoff '{}': {e}", config.cutoff)))?;
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            ParkError::Config(format!(
                "utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            ))
        })?;
        let mut closed = Vec::new();
        for day in &config.non_operating_days {
            let weekday: Weekday = day
                .parse()
                .map_err(|_| ParkError::Config(format!("invalid weekday '{day}'")))?;
            if !closed.contains(&weekday) {
                closed.push(weekday);
            }
        }
        Self::new(cutoff, offset, closed)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Wall-clock time in the configured zone.
    pub fn local(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.offset).naive_local()
    }

    pub fn local_now(&self) -> NaiveDateTime {
        self.local(Utc::now())
    }

    pub fn is_operating(&self, date: NaiveDate) -> bool {
        !self.closed.contains(&date.weekday())
    }

    /// The day a request submitted at `now` (local) applies to.
    pub fn target_date(&self, now: NaiveDateTime) -> NaiveDate {
        let mut target = if now.time() < self.cutoff {
            now.date()
        } else {
            now.date() + Duration::days(1)
        };
        while !self.is_operating(target) {
            target += Duration::days(1);
        }
        target
    }
}

impl Default for OperatingCalendar {
    fn default() -> Self {
        Self {
            cutoff: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            offset: FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix()),
            closed: vec![Weekday::Sat, Weekday::Sun],
        }
    }
}

/// Short English weekday name, e.g. `Mon`.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_before_cutoff_targets_today() {
        let cal = OperatingCalendar::default();
        // 2026-10-20 is a Tuesday
        assert_eq!(cal.target_date(at(2026, 10, 20, 7, 59)), date(2026, 10, 20));
    }

    #[test]
    fn test_at_cutoff_targets_tomorrow() {
        let cal = OperatingCalendar::default();
        assert_eq!(cal.target_date(at(2026, 10, 20, 8, 0)), date(2026, 10, 21));
    }

    #[test]
    fn test_weekend_skip() {
        let cal = OperatingCalendar::default();
        // Friday after cutoff -> Saturday -> Monday (+2)
        assert_eq!(cal.target_date(at(2026, 10, 23, 9, 0)), date(2026, 10, 26));
        // Saturday morning before cutoff -> Saturday -> Monday
        assert_eq!(cal.target_date(at(2026, 10, 24, 6, 0)), date(2026, 10, 26));
        // Saturday after cutoff -> Sunday -> Monday (+1)
        assert_eq!(cal.target_date(at(2026, 10, 24, 12, 0)), date(2026, 10, 26));
    }

    #[test]
    fn test_local_offset() {
        let cal = OperatingCalendar::default();
        let utc = DateTime::parse_from_rfc3339("2026-10-19T23:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        // 23:30 UTC is 08:30 next day in UTC+9
        assert_eq!(cal.local(utc), at(2026, 10, 20, 8, 30));
    }

    #[test]
    fn test_from_config() {
        let mut cfg = ScheduleConfig::default();
        cfg.non_operating_days = vec!["Sunday".into()];
        cfg.cutoff = "18:30".into();
        let cal = OperatingCalendar::from_config(&cfg).unwrap();
        assert!(cal.is_operating(date(2026, 10, 24)));
        assert!(!cal.is_operating(date(2026, 10, 25)));
        assert_eq!(cal.target_date(at(2026, 10, 20, 18, 0)), date(2026, 10, 20));
    }

    #[test]
    fn test_all_days_closed_rejected() {
        let mut cfg = ScheduleConfig::default();
        cfg.non_operating_days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(OperatingCalendar::from_config(&cfg).is_err());
    }
}
