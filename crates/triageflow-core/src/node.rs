//! Node identifiers for allocation flow graphs.
//!
//! Nodes are tagged values rather than concatenated string keys, so a
//! patient and a hospital with the same numeric id can never collide.

use std::fmt;

use crate::error::{AllocationError, Result};

/// Priority band shared by demand urgency and supply capacity.
///
/// Matching never crosses bands: a critical patient cannot take a low bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Band {
    Critical,
    Top,
    Mid,
    Low,
}

impl Band {
    /// All bands, most urgent first.
    pub const ALL: [Band; 4] = [Band::Critical, Band::Top, Band::Mid, Band::Low];

    /// Maps a stored priority level (1 = critical .. 4 = low) to its band.
    pub fn from_priority(level: i64) -> Result<Self> {
        match level {
            1 => Ok(Band::Critical),
            2 => Ok(Band::Top),
            3 => Ok(Band::Mid),
            4 => Ok(Band::Low),
            other => Err(AllocationError::InvalidBand(other)),
        }
    }

    /// Returns the stored priority level for this band.
    pub fn priority(self) -> i64 {
        match self {
            Band::Critical => 1,
            Band::Top => 2,
            Band::Mid => 3,
            Band::Low => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Critical => "critical",
            Band::Top => "top",
            Band::Mid => "mid",
            Band::Low => "low",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of domain entity a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityKind {
    Patient,
    Hospital,
    SupplyCenter,
    Zone,
}

impl EntityKind {
    fn prefix(self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Hospital => "hospital",
            EntityKind::SupplyCenter => "center",
            EntityKind::Zone => "zone",
        }
    }
}

/// A domain entity identity, namespaced by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u64,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: u64) -> Self {
        Self { kind, id }
    }

    pub fn patient(id: u64) -> Self {
        Self::new(EntityKind::Patient, id)
    }

    pub fn hospital(id: u64) -> Self {
        Self::new(EntityKind::Hospital, id)
    }

    pub fn center(id: u64) -> Self {
        Self::new(EntityKind::SupplyCenter, id)
    }

    pub fn zone(id: u64) -> Self {
        Self::new(EntityKind::Zone, id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.prefix(), self.id)
    }
}

/// Identifier of a node in a flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Source,
    Sink,
    /// A consumer of capacity (patient, disaster zone), optionally banded.
    Demand(EntityRef, Option<Band>),
    /// A provider of capacity (hospital band, supply center), optionally banded.
    Supply(EntityRef, Option<Band>),
    /// A named location in a route network.
    Site(String),
}

impl NodeId {
    pub fn demand(entity: EntityRef) -> Self {
        NodeId::Demand(entity, None)
    }

    pub fn supply(entity: EntityRef) -> Self {
        NodeId::Supply(entity, None)
    }

    pub fn banded_supply(entity: EntityRef, band: Band) -> Self {
        NodeId::Supply(entity, Some(band))
    }

    pub fn site(name: impl Into<String>) -> Self {
        NodeId::Site(name.into())
    }

    /// Returns true for the super source and super sink.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeId::Source | NodeId::Sink)
    }

    /// Returns the entity this node stands for, if any.
    pub fn entity(&self) -> Option<EntityRef> {
        match self {
            NodeId::Demand(e, _) | NodeId::Supply(e, _) => Some(*e),
            _ => None,
        }
    }

    pub fn band(&self) -> Option<Band> {
        match self {
            NodeId::Demand(_, b) | NodeId::Supply(_, b) => *b,
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Source => f.write_str("source"),
            NodeId::Sink => f.write_str("sink"),
            NodeId::Demand(e, None) => write!(f, "demand:{e}"),
            NodeId::Demand(e, Some(b)) => write!(f, "demand:{e}/{b}"),
            NodeId::Supply(e, None) => write!(f, "supply:{e}"),
            NodeId::Supply(e, Some(b)) => write!(f, "supply:{e}/{b}"),
            NodeId::Site(name) => write!(f, "site:{name}"),
        }
    }
}
