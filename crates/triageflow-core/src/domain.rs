//! Domain entities as read from the persistence layer.
//!
//! Numeric capacities are kept signed so that a negative value coming out
//! of storage can be detected and rejected instead of wrapping.

use crate::node::Band;

/// Identity of an item lot.
pub type ItemId = u64;

/// Available beds of one hospital, per priority band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandBeds {
    pub critical: i64,
    pub top: i64,
    pub mid: i64,
    pub low: i64,
}

impl BandBeds {
    pub fn new(critical: i64, top: i64, mid: i64, low: i64) -> Self {
        Self {
            critical,
            top,
            mid,
            low,
        }
    }

    pub fn get(&self, band: Band) -> i64 {
        match band {
            Band::Critical => self.critical,
            Band::Top => self.top,
            Band::Mid => self.mid,
            Band::Low => self.low,
        }
    }

    pub fn set(&mut self, band: Band, beds: i64) {
        match band {
            Band::Critical => self.critical = beds,
            Band::Top => self.top = beds,
            Band::Mid => self.mid = beds,
            Band::Low => self.low = beds,
        }
    }

    pub fn total(&self) -> i64 {
        self.critical + self.top + self.mid + self.low
    }
}

/// A patient waiting for a bed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patient {
    pub id: u64,
    pub name: String,
    /// 1 = critical, 2 = top, 3 = mid, 4 = low.
    pub priority_level: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hospital_id: Option<u64>,
}

impl Patient {
    pub fn new(id: u64, name: impl Into<String>, priority_level: i64) -> Self {
        Self {
            id,
            name: name.into(),
            priority_level,
            hospital_id: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.hospital_id.is_some()
    }
}

/// A hospital with banded bed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hospital {
    pub id: u64,
    pub name: String,
    pub beds: BandBeds,
}

impl Hospital {
    pub fn new(id: u64, name: impl Into<String>, beds: BandBeds) -> Self {
        Self {
            id,
            name: name.into(),
            beds,
        }
    }
}

/// Capacity for moving patients from one hospital to another.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HospitalTransfer {
    pub id: u64,
    pub from_hospital: u64,
    pub to_hospital: u64,
    pub capacity: i64,
}

/// A supply center holding stock.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupplyCenter {
    pub id: u64,
    pub name: String,
    pub total_stock: i64,
}

/// A disaster zone with unmet demand.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisasterZone {
    pub id: u64,
    pub name: String,
    pub demand: i64,
}

/// A route from a supply center to a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportRoute {
    pub id: u64,
    pub center_id: u64,
    pub zone_id: u64,
    pub send_limit: i64,
    /// Amount recorded by a previous transport run.
    #[cfg_attr(feature = "serde", serde(default))]
    pub amount_sent: Option<i64>,
}

/// A link between two named sites of a route network.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteLink {
    pub id: u64,
    pub from: String,
    pub to: String,
    pub max_capacity: i64,
}

/// A resource lot that can be packed into a capacity slot.
///
/// `quantity` identical units share one identity; a lot is selected into at
/// most one slot per cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub weight: i64,
    pub value: i64,
    pub quantity: i64,
    /// Slot that consumed this item in an earlier run.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub consumed: bool,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, weight: i64, value: i64, quantity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            weight,
            value,
            quantity,
            slot: None,
            consumed: false,
        }
    }

    /// A single-unit 0/1 item.
    pub fn single(id: ItemId, weight: i64, value: i64) -> Self {
        Self::new(id, format!("item-{id}"), weight, value, 1)
    }

    /// Returns true if this item can still be selected.
    pub fn is_available(&self) -> bool {
        !self.consumed && self.slot.is_none() && self.quantity > 0 && self.weight > 0
    }
}

/// One discrete capacity produced by a flow stage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacitySlot {
    pub id: u64,
    pub name: String,
    pub capacity: i64,
}

impl CapacitySlot {
    pub fn new(id: u64, name: impl Into<String>, capacity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
        }
    }
}
