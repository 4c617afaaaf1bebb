//! Tests for node identifiers and bands.

use std::collections::HashSet;

use crate::error::AllocationError;
use crate::node::{Band, EntityKind, EntityRef, NodeId};

#[test]
fn test_band_from_priority() {
    assert_eq!(Band::from_priority(1).unwrap(), Band::Critical);
    assert_eq!(Band::from_priority(2).unwrap(), Band::Top);
    assert_eq!(Band::from_priority(3).unwrap(), Band::Mid);
    assert_eq!(Band::from_priority(4).unwrap(), Band::Low);
}

#[test]
fn test_band_rejects_unknown_priority() {
    assert!(matches!(
        Band::from_priority(0),
        Err(AllocationError::InvalidBand(0))
    ));
    assert!(matches!(
        Band::from_priority(5),
        Err(AllocationError::InvalidBand(5))
    ));
}

#[test]
fn test_band_priority_roundtrip() {
    for band in Band::ALL {
        assert_eq!(Band::from_priority(band.priority()).unwrap(), band);
    }
}

#[test]
fn test_nodes_namespaced_by_kind() {
    let patient = NodeId::demand(EntityRef::patient(7));
    let zone = NodeId::demand(EntityRef::zone(7));
    let hospital = NodeId::supply(EntityRef::hospital(7));
    let center = NodeId::supply(EntityRef::center(7));

    let set: HashSet<_> = [patient, zone, hospital, center].into_iter().collect();
    assert_eq!(set.len(), 4);
}

#[test]
fn test_banded_nodes_distinct() {
    let h = EntityRef::hospital(1);
    assert_ne!(
        NodeId::banded_supply(h, Band::Critical),
        NodeId::banded_supply(h, Band::Low)
    );
    assert_ne!(NodeId::banded_supply(h, Band::Low), NodeId::supply(h));
}

#[test]
fn test_node_accessors() {
    let node = NodeId::banded_supply(EntityRef::hospital(3), Band::Mid);
    assert_eq!(node.entity(), Some(EntityRef::new(EntityKind::Hospital, 3)));
    assert_eq!(node.band(), Some(Band::Mid));
    assert!(!node.is_terminal());
    assert!(NodeId::Source.is_terminal());
    assert_eq!(NodeId::site("Dhaka").entity(), None);
}

#[test]
fn test_node_display() {
    assert_eq!(NodeId::Source.to_string(), "source");
    assert_eq!(
        NodeId::banded_supply(EntityRef::hospital(2), Band::Top).to_string(),
        "supply:hospital-2/top"
    );
    assert_eq!(
        NodeId::demand(EntityRef::patient(9)).to_string(),
        "demand:patient-9"
    );
    assert_eq!(NodeId::site("Khulna").to_string(), "site:Khulna");
}
