//! Plain-text allocation summary.

use parkalloc_core::calendar::weekday_name;
use parkalloc_core::config::NotifyConfig;
use parkalloc_core::model::{AllocationRecord, Capacities, Placement};
use std::fmt::Write;

const NONE_ASSIGNED: &str = "(none)";

/// Title and body of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub body: String,
}

impl Summary {
    /// Title and body joined for single-field targets.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.title, self.body)
    }
}

/// Summarize one date's allocation: occupancy per pool and in total, who
/// got which pool (times stripped), and the waitlist in priority order.
pub fn summarize(record: &AllocationRecord, capacities: Capacities, config: &NotifyConfig) -> Summary {
    let title = format!(
        "📅 {} ({}) parking allocation",
        record.date.format("%Y-%m-%d"),
        weekday_name(record.date)
    );

    let a = record.pool_a.len();
    let b = record.pool_b.len();
    let mut body = String::from("🅿️ Occupancy");
    occupancy(&mut body, "Total", a + b, capacities.total());
    occupancy(&mut body, &config.pool_a_name, a, capacities.pool_a);
    occupancy(&mut body, &config.pool_b_name, b, capacities.pool_b);

    let _ = write!(body, "\n\n🏢 {}", config.pool_a_name);
    bullets(&mut body, &record.pool_a);
    let _ = write!(body, "\n\n🅿️ {}", config.pool_b_name);
    bullets(&mut body, &record.pool_b);

    if !record.waitlist.is_empty() {
        body.push_str("\n\n⏳ Waitlist (lost on priority)");
        bullets(&mut body, &record.waitlist);
    }

    Summary { title, body }
}

fn occupancy(out: &mut String, name: &str, used: usize, capacity: usize) {
    let _ = write!(
        out,
        "\n• {name}: {used}/{capacity} (free: {})",
        capacity.saturating_sub(used)
    );
}

fn bullets(out: &mut String, list: &[Placement]) {
    if list.is_empty() {
        let _ = write!(out, "\n• {NONE_ASSIGNED}");
        return;
    }
    for p in list {
        let _ = write!(out, "\n• {}", p.short_label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use parkalloc_core::model::VehicleClass;

    fn record() -> AllocationRecord {
        let mut r = AllocationRecord::empty(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        r.pool_b.push(Placement::guest(
            "Visitor",
            VehicleClass::Compact,
            NaiveTime::from_hms_opt(9, 0, 0),
        ));
        r.pool_b.push(Placement::member("Kim", VehicleClass::Compact, None));
        r.waitlist.push(Placement::member(
            "Lee",
            VehicleClass::Large,
            NaiveTime::from_hms_opt(9, 30, 0),
        ));
        r
    }

    #[test]
    fn test_summary_layout() {
        let s = summarize(&record(), Capacities::default(), &NotifyConfig::default());
        assert_eq!(s.title, "📅 2026-10-20 (Tue) parking allocation");
        let expected = "🅿️ Occupancy\n\
                        • Total: 2/3 (free: 1)\n\
                        • Admin office: 0/1 (free: 1)\n\
                        • Tower: 2/2 (free: 0)\n\
                        \n\
                        🏢 Admin office\n\
                        • (none)\n\
                        \n\
                        🅿️ Tower\n\
                        • Visitor (COMPACT)\n\
                        • Kim (COMPACT)\n\
                        \n\
                        ⏳ Waitlist (lost on priority)\n\
                        • Lee (LARGE)";
        assert_eq!(s.body, expected);
    }

    #[test]
    fn test_no_waitlist_section_when_empty() {
        let mut r = record();
        r.waitlist.clear();
        let s = summarize(&r, Capacities::default(), &NotifyConfig::default());
        assert!(!s.body.contains("Waitlist"));
    }

    #[test]
    fn test_legacy_labels_stripped() {
        let mut r = AllocationRecord::empty(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        r.pool_a.push(Placement::Label("Park (SUV) 수동입력".into()));
        let config = NotifyConfig {
            pool_a_name: "Lobby".into(),
            ..NotifyConfig::default()
        };
        let s = summarize(&r, Capacities { pool_a: 1, pool_b: 3 }, &config);
        assert!(s.body.contains("• Lobby: 1/1 (free: 0)"));
        assert!(s.body.contains("• Park (SUV)"));
        assert!(!s.body.contains("수동입력"));
        assert!(s.text().starts_with("📅 2026-10-20 (Tue)"));
    }
}
