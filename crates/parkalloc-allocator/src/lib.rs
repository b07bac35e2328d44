//! # ParkAlloc Allocator
//!
//! Pure, deterministic assignment of parking candidates to two pools and a
//! waitlist. No IO, no clock: the same inputs always give the same output.
//!
//! ## Algorithm
//! ```text
//! guests (by submission time)  ──┐
//!                                ├─► greedy pass ─► pool A / pool B / waitlist
//! staff  (by fairness, then time)┘
//! ```
//! Guests always go first. Each candidate walks its allowed pools in order
//! and takes the first one with a free slot; otherwise it is waitlisted.

pub mod candidate;
pub mod fairness;

pub use candidate::{Candidate, CandidateKind, Pool};
pub use fairness::apply_fairness;

use chrono::NaiveDate;
use parkalloc_core::config::CapacityConfig;
use parkalloc_core::model::{
    AllocationRecord, Capacities, Guest, Member, Placement, RequestBatch, StaffRequest,
};

/// Result of one allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    pub pool_a: Vec<Placement>,
    pub pool_b: Vec<Placement>,
    pub waitlist: Vec<Placement>,
}

/// Rendered labels, `"<name> (<CLASS>) <HH:MM|manual>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationLabels {
    pub pool_a: Vec<String>,
    pub pool_b: Vec<String>,
    pub waitlist: Vec<String>,
}

impl Allocation {
    pub fn labels(&self) -> AllocationLabels {
        let render = |list: &[Placement]| list.iter().map(Placement::label).collect();
        AllocationLabels {
            pool_a: render(&self.pool_a),
            pool_b: render(&self.pool_b),
            waitlist: render(&self.waitlist),
        }
    }

    /// Staff members admitted to either pool.
    pub fn admitted_members(&self) -> Vec<&str> {
        self.pool_a
            .iter()
            .chain(self.pool_b.iter())
            .filter_map(Placement::member_name)
            .collect()
    }

    pub fn into_record(self, date: NaiveDate) -> AllocationRecord {
        AllocationRecord {
            date,
            pool_a: self.pool_a,
            pool_b: self.pool_b,
            waitlist: self.waitlist,
        }
    }
}

struct Slots {
    a: usize,
    b: usize,
}

impl Slots {
    fn take(&mut self, pool: Pool) -> bool {
        let left = match pool {
            Pool::A => &mut self.a,
            Pool::B => &mut self.b,
        };
        if *left > 0 {
            *left -= 1;
            true
        } else {
            false
        }
    }
}

/// Assign every candidate to exactly one of pool A, pool B or the waitlist.
pub fn allocate(
    members: &[Member],
    staff_requests: &[StaffRequest],
    guest_requests: &[Guest],
    capacities: Capacities,
) -> Allocation {
    let mut slots = Slots {
        a: capacities.pool_a,
        b: capacities.pool_b,
    };
    let mut out = Allocation::default();

    let guests = candidate::order_guests(guest_requests);
    let staff = candidate::order_staff(members, staff_requests);

    for c in guests.iter().chain(staff.iter()) {
        let placement = c.placement();
        match c.pools().iter().copied().find(|p| slots.take(*p)) {
            Some(Pool::A) => out.pool_a.push(placement),
            Some(Pool::B) => out.pool_b.push(placement),
            None => out.waitlist.push(placement),
        }
    }

    tracing::debug!(
        "🅿️ Allocated {} guests + {} staff: A {}/{}, B {}/{}, waitlist {}",
        guests.len(),
        staff.len(),
        out.pool_a.len(),
        capacities.pool_a,
        out.pool_b.len(),
        capacities.pool_b,
        out.waitlist.len()
    );
    out
}

/// Allocate a whole batch with the capacities its toggle implies.
pub fn allocate_batch(
    members: &[Member],
    batch: &RequestBatch,
    config: &CapacityConfig,
) -> (Allocation, Capacities) {
    let capacities = Capacities::for_batch(config, batch);
    let allocation = allocate(
        members,
        &batch.staff_requests,
        &batch.guest_requests,
        capacities,
    );
    (allocation, capacities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use parkalloc_core::model::{ParkingPreference, VehicleClass};

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn guest(name: &str, class: VehicleClass, pref: ParkingPreference, at: NaiveDateTime) -> Guest {
        Guest {
            display_name: name.into(),
            vehicle_class: class,
            parking_preference: pref,
            purpose: "visit".into(),
            sponsor_member_name: "Kim".into(),
            submitted_at: Some(at),
        }
    }

    fn default_caps() -> Capacities {
        Capacities { pool_a: 1, pool_b: 2 }
    }

    #[test]
    fn test_guest_first_then_fairness() {
        let a = Member::new("A", VehicleClass::Compact);
        let mut b = Member::new("B", VehicleClass::Compact);
        b.last_allocated_date = NaiveDate::from_ymd_opt(2026, 10, 18);
        let guests = vec![guest("X", VehicleClass::Compact, ParkingPreference::PoolB, ts(9, 0))];
        let staff = vec![StaffRequest::new("A", ts(9, 5)), StaffRequest::new("B", ts(9, 1))];

        let result = allocate(&[a, b], &staff, &guests, default_caps());
        let labels = result.labels();
        assert_eq!(labels.pool_b, vec!["X (COMPACT) 09:00", "A (COMPACT) 09:05"]);
        // B falls through to the free pool A slot
        assert_eq!(labels.pool_a, vec!["B (COMPACT) 09:01"]);
        assert!(labels.waitlist.is_empty());
    }

    #[test]
    fn test_large_staff_waitlisted_when_pool_a_taken() {
        let suv = Member::new("Suv", VehicleClass::Large);
        let guests = vec![guest("G", VehicleClass::Large, ParkingPreference::PoolA, ts(10, 0))];
        let staff = vec![StaffRequest::new("Suv", ts(8, 0))];

        let result = allocate(&[suv], &staff, &guests, default_caps());
        assert_eq!(result.pool_a.len(), 1);
        assert_eq!(result.pool_a[0].label(), "G (LARGE) 10:00");
        assert!(result.pool_b.is_empty());
        assert_eq!(result.waitlist[0].label(), "Suv (LARGE) 08:00");
    }

    #[test]
    fn test_toggle_admits_third_compact_to_pool_b() {
        let members: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| Member::new(n, VehicleClass::Compact))
            .collect();
        let staff: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, n)| StaffRequest::new(n, ts(9, i as u32)))
            .collect();

        let batch = RequestBatch {
            target_date: NaiveDate::from_ymd_opt(2026, 10, 20),
            staff_requests: staff,
            guest_requests: vec![],
            pool_b_reduced: false,
        };
        let (normal, caps) = allocate_batch(&members, &batch, &CapacityConfig::default());
        assert_eq!(caps.pool_b, 2);
        assert_eq!(normal.pool_b.len(), 2);
        assert_eq!(normal.pool_a[0].member_name(), Some("C"));
        assert_eq!(normal.waitlist[0].member_name(), Some("D"));

        let toggled = RequestBatch {
            pool_b_reduced: true,
            ..batch
        };
        let (more, caps) = allocate_batch(&members, &toggled, &CapacityConfig::default());
        assert_eq!(caps.pool_b, 3);
        let b: Vec<_> = more.pool_b.iter().filter_map(Placement::member_name).collect();
        assert_eq!(b, vec!["A", "B", "C"]);
        assert_eq!(more.pool_a[0].member_name(), Some("D"));
        assert!(more.waitlist.is_empty());
    }

    #[test]
    fn test_guest_preferences_never_spill() {
        let guests = vec![
            guest("A1", VehicleClass::Compact, ParkingPreference::PoolA, ts(8, 0)),
            guest("A2", VehicleClass::Compact, ParkingPreference::PoolA, ts(8, 1)),
            guest("B1", VehicleClass::Compact, ParkingPreference::PoolB, ts(8, 2)),
            guest("B2", VehicleClass::Compact, ParkingPreference::PoolB, ts(8, 3)),
            guest("B3", VehicleClass::Compact, ParkingPreference::PoolB, ts(8, 4)),
        ];
        let result = allocate(&[], &[], &guests, default_caps());
        let labels = result.labels();
        assert_eq!(labels.pool_a, vec!["A1 (COMPACT) 08:00"]);
        assert_eq!(labels.pool_b, vec!["B1 (COMPACT) 08:02", "B2 (COMPACT) 08:03"]);
        assert_eq!(
            labels.waitlist,
            vec!["A2 (COMPACT) 08:01", "B3 (COMPACT) 08:04"]
        );
    }

    #[test]
    fn test_either_guest_prefers_pool_b() {
        let guests = vec![
            guest("E1", VehicleClass::Compact, ParkingPreference::Either, ts(8, 0)),
            guest("E2", VehicleClass::Compact, ParkingPreference::Either, ts(8, 1)),
            guest("E3", VehicleClass::Compact, ParkingPreference::Either, ts(8, 2)),
            guest("E4", VehicleClass::Compact, ParkingPreference::Either, ts(8, 3)),
        ];
        let result = allocate(&[], &[], &guests, default_caps());
        assert_eq!(result.pool_b.len(), 2);
        assert_eq!(result.pool_a[0].label(), "E3 (COMPACT) 08:02");
        assert_eq!(result.waitlist[0].label(), "E4 (COMPACT) 08:03");
    }

    #[test]
    fn test_guest_beats_earlier_staff() {
        let kim = Member::new("Kim", VehicleClass::Large);
        let staff = vec![StaffRequest::new("Kim", ts(6, 0))];
        let guests = vec![guest("Late", VehicleClass::Compact, ParkingPreference::PoolA, ts(23, 0))];
        let result = allocate(&[kim], &staff, &guests, default_caps());
        assert_eq!(result.pool_a[0].label(), "Late (COMPACT) 23:00");
        assert_eq!(result.waitlist[0].member_name(), Some("Kim"));
    }

    #[test]
    fn test_malformed_large_pool_b_guest_waitlisted() {
        let guests = vec![guest("Bus", VehicleClass::Large, ParkingPreference::PoolB, ts(8, 0))];
        let result = allocate(&[], &[], &guests, default_caps());
        assert!(result.pool_a.is_empty());
        assert!(result.pool_b.is_empty());
        assert_eq!(result.waitlist.len(), 1);
    }

    #[test]
    fn test_manual_requests_render_manual() {
        let kim = Member::new("Kim", VehicleClass::Compact);
        let staff = vec![StaffRequest {
            member_name: "Kim".into(),
            submitted_at: None,
        }];
        let result = allocate(&[kim], &staff, &[], default_caps());
        assert_eq!(result.labels().pool_b, vec!["Kim (COMPACT) manual"]);
        assert_eq!(result.admitted_members(), vec!["Kim"]);
    }

    #[test]
    fn test_zero_capacity_waitlists_everyone() {
        let kim = Member::new("Kim", VehicleClass::Compact);
        let staff = vec![StaffRequest::new("Kim", ts(8, 0))];
        let result = allocate(&[kim], &staff, &[], Capacities { pool_a: 0, pool_b: 0 });
        assert_eq!(result.waitlist.len(), 1);
        assert!(result.admitted_members().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn arb_class() -> impl Strategy<Value = VehicleClass> {
            prop_oneof![Just(VehicleClass::Compact), Just(VehicleClass::Large)]
        }

        fn arb_pref() -> impl Strategy<Value = ParkingPreference> {
            prop_oneof![
                Just(ParkingPreference::PoolA),
                Just(ParkingPreference::PoolB),
                Just(ParkingPreference::Either),
            ]
        }

        fn arb_input() -> impl Strategy<
            Value = (Vec<Member>, Vec<StaffRequest>, Vec<Guest>, Capacities),
        > {
            let members = prop::collection::vec((arb_class(), prop::option::of(0u32..30)), 0..8);
            let guests = prop::collection::vec(
                (arb_class(), arb_pref(), prop::option::of(0u32..600)),
                0..6,
            );
            (members, guests, 0usize..3, 0usize..4, any::<u64>()).prop_map(
                |(members, guests, a, b, seed)| {
                    let day = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
                    let members: Vec<Member> = members
                        .into_iter()
                        .enumerate()
                        .map(|(i, (class, last))| {
                            let mut m = Member::new(&format!("m{i}"), class);
                            m.last_allocated_date =
                                last.map(|d| day + chrono::Duration::days(d as i64));
                            m
                        })
                        .collect();
                    let staff: Vec<StaffRequest> = members
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| (seed >> i) & 1 == 1)
                        .map(|(i, m)| StaffRequest::new(&m.name, ts(9, (i * 7 % 60) as u32)))
                        .collect();
                    let guests: Vec<Guest> = guests
                        .into_iter()
                        .enumerate()
                        .map(|(i, (class, pref, minute))| Guest {
                            display_name: format!("g{i}"),
                            vehicle_class: class,
                            parking_preference: pref,
                            purpose: "p".into(),
                            sponsor_member_name: "s".into(),
                            submitted_at: minute.map(|m| ts(m / 60, m % 60)),
                        })
                        .collect();
                    (members, staff, guests, Capacities { pool_a: a, pool_b: b })
                },
            )
        }

        proptest! {
            #[test]
            fn prop_capacity_and_exactly_once((members, staff, guests, caps) in arb_input()) {
                let result = allocate(&members, &staff, &guests, caps);
                prop_assert!(result.pool_a.len() <= caps.pool_a);
                prop_assert!(result.pool_b.len() <= caps.pool_b);
                let total = result.pool_a.len() + result.pool_b.len() + result.waitlist.len();
                prop_assert_eq!(total, staff.len() + guests.len());
            }

            #[test]
            fn prop_large_never_in_pool_b((members, staff, guests, caps) in arb_input()) {
                let result = allocate(&members, &staff, &guests, caps);
                for p in &result.pool_b {
                    prop_assert!(!p.label().contains("(LARGE)"));
                }
            }

            #[test]
            fn prop_deterministic((members, staff, guests, caps) in arb_input()) {
                let first = allocate(&members, &staff, &guests, caps);
                let second = allocate(&members, &staff, &guests, caps);
                prop_assert_eq!(first, second);
            }
        }
    }
}
