//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds), evaluated in
//! local wall-clock time.
//! Fields: *, */N, N, A-B, comma lists. DOM and MON accept only `*`.
//! Example: "30 7 * * 1-5" = weekdays at 07:30

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use parkalloc_core::error::{ParkError, Result};

/// A parsed daily schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    minutes: Vec<u32>,
    hours: Vec<u32>,
    /// 0 = Sunday .. 6 = Saturday.
    days_of_week: Vec<u32>,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(ParkError::Config(format!(
                "invalid cron expression '{expression}' (need 5 fields: MIN HOUR DOM MON DOW)"
            )));
        }
        if parts[2] != "*" || parts[3] != "*" {
            return Err(ParkError::Config(format!(
                "cron '{expression}': day-of-month and month must be '*'"
            )));
        }
        let field = |spec: &str, min, max, what: &str| {
            parse_field(spec, min, max).ok_or_else(|| {
                ParkError::Config(format!("cron '{expression}': bad {what} field '{spec}'"))
            })
        };
        Ok(Self {
            minutes: field(parts[0], 0, 59, "minute")?,
            hours: field(parts[1], 0, 23, "hour")?,
            days_of_week: field(parts[4], 0, 6, "day-of-week")?,
        })
    }

    fn matches(&self, t: NaiveDateTime) -> bool {
        self.minutes.contains(&t.minute())
            && self.hours.contains(&t.hour())
            && self
                .days_of_week
                .contains(&t.weekday().num_days_from_sunday())
    }

    /// First matching minute strictly after `after`, within 8 days.
    pub fn next_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut candidate = after + Duration::minutes(1);
        candidate = candidate.with_second(0).unwrap_or(candidate);
        candidate = candidate.with_nanosecond(0).unwrap_or(candidate);

        for _ in 0..(8 * 24 * 60) {
            if self.matches(candidate) {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }

    /// Whether a fire time falls in `(last_check, now]`.
    pub fn is_due(&self, last_check: NaiveDateTime, now: NaiveDateTime) -> bool {
        self.next_after(last_check).is_some_and(|next| next <= now)
    }
}

/// Parse a cron field into a list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N: every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    if field.contains(',') {
        let mut vals = Vec::new();
        for part in field.split(',') {
            vals.extend(parse_field(part.trim(), min, max)?);
        }
        vals.sort_unstable();
        vals.dedup();
        return Some(vals);
    }

    if let Some((lo, hi)) = field.split_once('-') {
        let lo: u32 = lo.parse().ok()?;
        let hi: u32 = hi.parse().ok()?;
        if lo > hi || lo < min || hi > max {
            return None;
        }
        return Some((lo..=hi).collect());
    }

    let n: u32 = field.parse().ok()?;
    if n >= min && n <= max {
        Some(vec![n])
    } else {
        None
    }
}
