//! Fairness bookkeeping applied after a run is committed.

use chrono::NaiveDate;
use parkalloc_core::model::Member;

/// Stamp `date` as the last allocated date of every admitted member.
/// Waitlisted and unknown names are left alone. Returns how many changed.
pub fn apply_fairness(members: &mut [Member], admitted: &[&str], date: NaiveDate) -> usize {
    let mut updated = 0;
    for member in members.iter_mut() {
        if admitted.contains(&member.name.as_str()) {
            member.last_allocated_date = Some(date);
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkalloc_core::model::VehicleClass;

    #[test]
    fn test_only_admitted_members_stamped() {
        let old = NaiveDate::from_ymd_opt(2026, 10, 1);
        let mut members = vec![
            Member::new("Kim", VehicleClass::Compact),
            Member::new("Lee", VehicleClass::Large),
        ];
        members[1].last_allocated_date = old;
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();

        let n = apply_fairness(&mut members, &["Kim", "Ghost"], date);
        assert_eq!(n, 1);
        assert_eq!(members[0].last_allocated_date, Some(date));
        assert_eq!(members[1].last_allocated_date, old);
    }
}
