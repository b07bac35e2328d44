//! Candidate normalization and priority ordering.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use parkalloc_core::model::{Guest, Member, ParkingPreference, Placement, StaffRequest, VehicleClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Staff,
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    A,
    B,
}

/// A staff or guest request in the one shape the assignment pass works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub name: String,
    pub vehicle_class: VehicleClass,
    pub submitted_at: Option<NaiveDateTime>,
    /// Fairness field; always `None` for guests.
    pub last_allocated: Option<NaiveDate>,
    pub preference: ParkingPreference,
}

impl Candidate {
    pub fn from_guest(guest: &Guest) -> Self {
        Self {
            kind: CandidateKind::Guest,
            name: guest.display_name.clone(),
            vehicle_class: guest.vehicle_class,
            submitted_at: guest.submitted_at,
            last_allocated: None,
            preference: guest.parking_preference,
        }
    }

    /// Staff have no stated preference: LARGE cars need pool A, COMPACT take either.
    pub fn from_staff(request: &StaffRequest, member: &Member) -> Self {
        let preference = match member.vehicle_class {
            VehicleClass::Large => ParkingPreference::PoolA,
            VehicleClass::Compact => ParkingPreference::Either,
        };
        Self {
            kind: CandidateKind::Staff,
            name: member.name.clone(),
            vehicle_class: member.vehicle_class,
            submitted_at: request.submitted_at,
            last_allocated: member.last_allocated_date,
            preference,
        }
    }

    /// Pools this candidate may take, in order of preference.
    /// LARGE cars never go to pool B, whatever was requested.
    pub fn pools(&self) -> &'static [Pool] {
        match (self.preference, self.vehicle_class) {
            (ParkingPreference::PoolA, _) => &[Pool::A],
            (ParkingPreference::PoolB, VehicleClass::Compact) => &[Pool::B],
            (ParkingPreference::PoolB, VehicleClass::Large) => &[],
            (ParkingPreference::Either, VehicleClass::Compact) => &[Pool::B, Pool::A],
            (ParkingPreference::Either, VehicleClass::Large) => &[Pool::A],
        }
    }

    pub fn placement(&self) -> Placement {
        let time = self.submitted_at.map(|ts| ts.time());
        match self.kind {
            CandidateKind::Staff => Placement::member(&self.name, self.vehicle_class, time),
            CandidateKind::Guest => Placement::guest(&self.name, self.vehicle_class, time),
        }
    }
}

/// Guests in submission order (earliest first, ties keep input order).
pub fn order_guests(guests: &[Guest]) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = guests.iter().map(Candidate::from_guest).collect();
    out.sort_by_key(|c| c.submitted_at);
    out
}

/// Staff by the fairness rule: longest without a slot first (never allocated
/// before anyone with a date), then submission time, then input order.
///
/// Requests for unknown members are dropped, as are repeat requests.
pub fn order_staff(members: &[Member], requests: &[StaffRequest]) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(requests.len());
    for request in requests {
        let Some(member) = members.iter().find(|m| m.name == request.member_name) else {
            tracing::warn!(
                "⚠️ Skipping request for unknown member '{}'",
                request.member_name
            );
            continue;
        };
        if !seen.insert(member.name.as_str()) {
            tracing::warn!("⚠️ Skipping repeat request for '{}'", member.name);
            continue;
        }
        out.push(Candidate::from_staff(request, member));
    }
    out.sort_by_key(|c| (c.last_allocated, c.submitted_at));
    out
}
