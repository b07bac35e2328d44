//! Input and report shapes for the desk.

use chrono::NaiveDate;
use parkalloc_core::error::{ParkError, Result};
use parkalloc_core::model::{ParkingPreference, VehicleClass};
use serde::{Deserialize, Serialize};

/// A guest registration before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestForm {
    pub display_name: String,
    pub vehicle_class: VehicleClass,
    pub parking_preference: ParkingPreference,
    pub purpose: String,
    pub sponsor_member_name: String,
}

impl GuestForm {
    /// Trim text fields and reject empty ones or a LARGE car outside pool A.
    pub fn validated(self) -> Result<Self> {
        let display_name = required("guest name", &self.display_name)?;
        let purpose = required("purpose", &self.purpose)?;
        let sponsor_member_name = required("sponsor", &self.sponsor_member_name)?;
        if self.vehicle_class == VehicleClass::Large
            && self.parking_preference != ParkingPreference::PoolA
        {
            return Err(ParkError::Validation(format!(
                "LARGE vehicles can only request POOL_A, not {}",
                self.parking_preference
            )));
        }
        Ok(Self {
            display_name,
            purpose,
            sponsor_member_name,
            ..self
        })
    }
}

pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParkError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Partial member edit. `None` keeps the field; an empty plate or detail
/// string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub vehicle_class: Option<VehicleClass>,
    pub plate: Option<String>,
    pub vehicle_detail: Option<String>,
}

/// Inclusive date filter; open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

/// One row of the member listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReport {
    pub name: String,
    pub vehicle_class: VehicleClass,
    pub plate: Option<String>,
    pub vehicle_detail: Option<String>,
    /// Newest History date with this member in pool A or B.
    pub last_parked: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> GuestForm {
        GuestForm {
            display_name: "  Visitor ".into(),
            vehicle_class: VehicleClass::Compact,
            parking_preference: ParkingPreference::Either,
            purpose: "Interview".into(),
            sponsor_member_name: "Kim".into(),
        }
    }

    #[test]
    fn test_trims_fields() {
        assert_eq!(form().validated().unwrap().display_name, "Visitor");
    }

    #[test]
    fn test_blank_fields_rejected() {
        let blank = GuestForm {
            purpose: "   ".into(),
            ..form()
        };
        assert!(matches!(blank.validated(), Err(ParkError::Validation(_))));
    }

    #[test]
    fn test_large_needs_pool_a() {
        for pref in [ParkingPreference::PoolB, ParkingPreference::Either] {
            let f = GuestForm {
                vehicle_class: VehicleClass::Large,
                parking_preference: pref,
                ..form()
            };
            assert!(f.validated().is_err());
        }
        let ok = GuestForm {
            vehicle_class: VehicleClass::Large,
            parking_preference: ParkingPreference::PoolA,
            ..form()
        };
        assert!(ok.validated().is_ok());
    }

    #[test]
    fn test_date_range() {
        let d = |day| NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        let range = DateRange {
            from: Some(d(10)),
            to: Some(d(20)),
        };
        assert!(range.contains(d(10)));
        assert!(range.contains(d(20)));
        assert!(!range.contains(d(21)));
        assert!(DateRange::default().contains(d(1)));
    }
}
