//! Domain model: members, request batches, guests and allocation records.
//!
//! Every type here is persisted as JSON. Field aliases keep documents written
//! by the older tooling loadable (`car_type`, `applicants`, `sante_opt_out`, ...);
//! only the canonical names are ever written back.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::CapacityConfig;
use crate::error::ParkError;

/// Label suffix for entries without a submission time.
pub const MANUAL: &str = "manual";

/// Car size class. LARGE cars only fit pool A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleClass {
    #[serde(alias = "SEDAN")]
    Compact,
    #[serde(alias = "SUV")]
    Large,
}

impl VehicleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "COMPACT",
            Self::Large => "LARGE",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = ParkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMPACT" | "SEDAN" => Ok(Self::Compact),
            "LARGE" | "SUV" => Ok(Self::Large),
            other => Err(ParkError::Validation(format!(
                "unknown vehicle class '{other}' (expected COMPACT or LARGE)"
            ))),
        }
    }
}

/// Which pool a guest asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParkingPreference {
    PoolA,
    PoolB,
    Either,
}

impl ParkingPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoolA => "POOL_A",
            Self::PoolB => "POOL_B",
            Self::Either => "EITHER",
        }
    }
}

impl fmt::Display for ParkingPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParkingPreference {
    type Err = ParkError;

    /// Accepts the canonical names as well as the older location strings,
    /// which embed `ADMIN`, `TOWER` or `ANY` (e.g. `"관리실(ADMIN)"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        match upper.as_str() {
            "POOL_A" | "A" => return Ok(Self::PoolA),
            "POOL_B" | "B" => return Ok(Self::PoolB),
            "EITHER" => return Ok(Self::Either),
            _ => {}
        }
        if upper.contains("ADMIN") {
            Ok(Self::PoolA)
        } else if upper.contains("TOWER") {
            Ok(Self::PoolB)
        } else if upper.contains("ANY") {
            Ok(Self::Either)
        } else {
            Err(ParkError::Validation(format!(
                "unknown parking preference '{s}' (expected POOL_A, POOL_B or EITHER)"
            )))
        }
    }
}

impl<'de> Deserialize<'de> for ParkingPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A registered staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(alias = "car_type")]
    pub vehicle_class: VehicleClass,
    #[serde(default, alias = "car_number", deserialize_with = "lenient_opt")]
    pub plate: Option<String>,
    #[serde(default, alias = "car_details", deserialize_with = "lenient_opt")]
    pub vehicle_detail: Option<String>,
    /// Fairness field: the last date this member was admitted to a pool.
    #[serde(default, alias = "last_parked_date", deserialize_with = "lenient_opt")]
    pub last_allocated_date: Option<NaiveDate>,
}

impl Member {
    pub fn new(name: &str, vehicle_class: VehicleClass) -> Self {
        Self {
            name: name.to_string(),
            vehicle_class,
            plate: None,
            vehicle_detail: None,
            last_allocated_date: None,
        }
    }
}

/// One staff request in the active batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StaffRequestRepr")]
pub struct StaffRequest {
    pub member_name: String,
    /// `None` for entries created without a timestamp; these sort first.
    pub submitted_at: Option<NaiveDateTime>,
}

impl StaffRequest {
    pub fn new(member_name: &str, submitted_at: NaiveDateTime) -> Self {
        Self {
            member_name: member_name.to_string(),
            submitted_at: Some(submitted_at),
        }
    }
}

/// Staff requests were stored either as a bare name or as an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum StaffRequestRepr {
    Name(String),
    Full {
        #[serde(alias = "name")]
        member_name: String,
        #[serde(default, alias = "timestamp", deserialize_with = "lenient_opt")]
        submitted_at: Option<NaiveDateTime>,
    },
}

impl From<StaffRequestRepr> for StaffRequest {
    fn from(repr: StaffRequestRepr) -> Self {
        match repr {
            StaffRequestRepr::Name(member_name) => Self {
                member_name,
                submitted_at: None,
            },
            StaffRequestRepr::Full {
                member_name,
                submitted_at,
            } => Self {
                member_name,
                submitted_at,
            },
        }
    }
}

/// A visitor registered by a staff sponsor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "car_type")]
    pub vehicle_class: VehicleClass,
    #[serde(alias = "location")]
    pub parking_preference: ParkingPreference,
    #[serde(default, alias = "reason")]
    pub purpose: String,
    #[serde(default, alias = "researcher")]
    pub sponsor_member_name: String,
    #[serde(default, alias = "timestamp", deserialize_with = "lenient_opt")]
    pub submitted_at: Option<NaiveDateTime>,
}

/// The single active request batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBatch {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, alias = "applicants")]
    pub staff_requests: Vec<StaffRequest>,
    #[serde(default, alias = "guests")]
    pub guest_requests: Vec<Guest>,
    /// Day-scoped toggle; `true` frees one extra pool B slot.
    #[serde(default, alias = "sante_opt_out")]
    pub pool_b_reduced: bool,
}

impl RequestBatch {
    /// Fresh empty batch for `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            target_date: Some(date),
            ..Self::default()
        }
    }

    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.target_date == Some(date)
    }

    pub fn is_empty(&self) -> bool {
        self.staff_requests.is_empty() && self.guest_requests.is_empty()
    }

    pub fn has_staff_request(&self, member_name: &str) -> bool {
        self.staff_requests
            .iter()
            .any(|r| r.member_name == member_name)
    }
}

/// One entry in an allocation record.
///
/// Staff and guest entries keep their identity next to the rendered label,
/// so renames update history without touching display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Placement {
    Member {
        member: String,
        vehicle_class: VehicleClass,
        #[serde(default)]
        time: Option<NaiveTime>,
    },
    Guest {
        guest: String,
        vehicle_class: VehicleClass,
        #[serde(default)]
        time: Option<NaiveTime>,
    },
    /// Free-form label from older history documents.
    Label(String),
}

impl Placement {
    pub fn member(name: &str, vehicle_class: VehicleClass, time: Option<NaiveTime>) -> Self {
        Self::Member {
            member: name.to_string(),
            vehicle_class,
            time,
        }
    }

    pub fn guest(name: &str, vehicle_class: VehicleClass, time: Option<NaiveTime>) -> Self {
        Self::Guest {
            guest: name.to_string(),
            vehicle_class,
            time,
        }
    }

    /// `"<name> (<CLASS>) <HH:MM|manual>"`.
    pub fn label(&self) -> String {
        match self {
            Self::Member {
                member: name,
                vehicle_class,
                time,
            }
            | Self::Guest {
                guest: name,
                vehicle_class,
                time,
            } => {
                let when = time
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_else(|| MANUAL.to_string());
                format!("{name} ({vehicle_class}) {when}")
            }
            Self::Label(label) => label.clone(),
        }
    }

    /// Label without the submission time, as shown in notifications.
    pub fn short_label(&self) -> String {
        match self {
            Self::Member {
                member: name,
                vehicle_class,
                ..
            }
            | Self::Guest {
                guest: name,
                vehicle_class,
                ..
            } => format!("{name} ({vehicle_class})"),
            Self::Label(label) => match label.rsplit_once(' ') {
                Some((head, tail)) if tail.contains(':') || tail == MANUAL || tail == "수동입력" => {
                    head.to_string()
                }
                _ => label.clone(),
            },
        }
    }

    /// Name of the staff member this entry refers to, if any.
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Self::Member { member, .. } => Some(member),
            _ => None,
        }
    }

    /// Point a staff entry, structured or legacy label, at a renamed member.
    /// Returns whether it changed.
    pub fn rename_member(&mut self, old: &str, new: &str, class: VehicleClass) -> bool {
        match self {
            Self::Member {
                member,
                vehicle_class,
                ..
            } if member == old => {
                let changed = member != new || *vehicle_class != class;
                *member = new.to_string();
                *vehicle_class = class;
                changed
            }
            // "Old (SEDAN) 09:01" -> "New (COMPACT) 09:01"
            Self::Label(label) if label == old || label.starts_with(&format!("{old} (")) => {
                let tail = label.rsplit_once(')').map(|(_, t)| t).unwrap_or("");
                let renamed = format!("{new} ({class}){tail}");
                let changed = *label != renamed;
                *label = renamed;
                changed
            }
            _ => false,
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The outcome for one calendar date. At most one per date in History.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub date: NaiveDate,
    #[serde(default, alias = "admin")]
    pub pool_a: Vec<Placement>,
    #[serde(default, alias = "tower")]
    pub pool_b: Vec<Placement>,
    #[serde(default, alias = "wait")]
    pub waitlist: Vec<Placement>,
}

impl AllocationRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            pool_a: Vec::new(),
            pool_b: Vec::new(),
            waitlist: Vec::new(),
        }
    }

    /// Entries admitted to either pool, pool A first.
    pub fn admitted(&self) -> impl Iterator<Item = &Placement> {
        self.pool_a.iter().chain(self.pool_b.iter())
    }

    pub fn placements_mut(&mut self) -> impl Iterator<Item = &mut Placement> {
        self.pool_a
            .iter_mut()
            .chain(self.pool_b.iter_mut())
            .chain(self.waitlist.iter_mut())
    }

    /// Whether `member_name` parked (pool A or B) on this date.
    pub fn parked(&self, member_name: &str) -> bool {
        self.admitted()
            .any(|p| p.member_name() == Some(member_name))
    }
}

/// Slot counts in force for one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    pub pool_a: usize,
    pub pool_b: usize,
}

impl Capacities {
    /// `pool_b_reduced` adds the configured bonus to pool B.
    pub fn from_config(config: &CapacityConfig, pool_b_reduced: bool) -> Self {
        let bonus = if pool_b_reduced { config.pool_b_bonus } else { 0 };
        Self {
            pool_a: config.pool_a,
            pool_b: config.pool_b + bonus,
        }
    }

    pub fn for_batch(config: &CapacityConfig, batch: &RequestBatch) -> Self {
        Self::from_config(config, batch.pool_b_reduced)
    }

    pub fn total(&self) -> usize {
        self.pool_a + self.pool_b
    }
}

impl Default for Capacities {
    fn default() -> Self {
        Self::from_config(&CapacityConfig::default(), false)
    }
}

/// Deserialize `Option<T>` treating `null`, `""` and whitespace as `None`.
fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
