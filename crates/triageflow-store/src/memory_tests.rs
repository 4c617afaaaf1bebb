use triageflow_core::{AllocationStore, Band, CapacitySlot, CommitBatch, Item, Mutation, StoreError};
use triageflow_test::{center, hospital, patient, route, zone};

use crate::InMemoryStore;

fn batch(mutations: Vec<Mutation>) -> CommitBatch {
    let mut batch = CommitBatch::new();
    for m in mutations {
        batch.push(m);
    }
    batch
}

fn ward() -> InMemoryStore {
    InMemoryStore::new()
        .with_patients([patient(1, 1), patient(2, 3)])
        .with_hospitals([hospital(1, [1, 0, 2, 0])])
}

#[test]
fn test_unassigned_patients_only() {
    let mut store = ward();
    store
        .commit(batch(vec![Mutation::AssignPatient {
            patient_id: 1,
            hospital_id: 1,
        }]))
        .unwrap();

    let waiting = store.unassigned_patients().unwrap();
    assert_eq!(waiting.len(), 1);
    assert_eq!(waiting[0].id, 2);
    assert_eq!(store.revision(), 1);
}

#[test]
fn test_failed_batch_leaves_no_trace() {
    let mut store = ward();
    let err = store
        .commit(batch(vec![
            Mutation::AssignPatient {
                patient_id: 1,
                hospital_id: 1,
            },
            Mutation::SetHospitalBeds {
                hospital_id: 1,
                band: Band::Critical,
                available: 0,
            },
            Mutation::AssignPatient {
                patient_id: 2,
                hospital_id: 9,
            },
        ]))
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { entity: "hospital", .. }));
    assert_eq!(store.patient(1).unwrap().hospital_id, None);
    assert_eq!(store.hospital(1).unwrap().beds.critical, 1);
    assert_eq!(store.revision(), 0);
}

#[test]
fn test_double_assignment_conflicts() {
    let mut store = ward();
    let assign = || Mutation::AssignPatient {
        patient_id: 2,
        hospital_id: 1,
    };
    store.commit(batch(vec![assign()])).unwrap();
    let err = store.commit(batch(vec![assign()])).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(store.revision(), 1);
}

#[test]
fn test_negative_levels_rejected() {
    let mut store = InMemoryStore::new()
        .with_centers([center(1, 5)])
        .with_zones([zone(1, 3)]);

    let err = store
        .commit(batch(vec![
            Mutation::SetCenterStock {
                center_id: 1,
                total_stock: 2,
            },
            Mutation::SetZoneDemand {
                zone_id: 1,
                demand: -1,
            },
        ]))
        .unwrap_err();

    assert!(matches!(err, StoreError::Rejected(_)));
    assert_eq!(store.center(1).unwrap().total_stock, 5);
    assert_eq!(store.zone(1).unwrap().demand, 3);
}

#[test]
fn test_route_flow_updates_or_creates() {
    let mut store = InMemoryStore::new().with_routes([route(4, 1, 1, 10)]);
    store
        .commit(batch(vec![
            Mutation::RecordRouteFlow {
                center_id: 1,
                zone_id: 1,
                amount: 6,
            },
            Mutation::RecordRouteFlow {
                center_id: 2,
                zone_id: 1,
                amount: 3,
            },
        ]))
        .unwrap();

    let existing = store.route(4).unwrap();
    assert_eq!(existing.send_limit, 10);
    assert_eq!(existing.amount_sent, Some(6));

    let created = store.route(5).unwrap();
    assert_eq!((created.center_id, created.zone_id), (2, 1));
    assert_eq!(created.send_limit, 3);
    assert_eq!(created.amount_sent, Some(3));
}

#[test]
fn test_replace_slots() {
    let mut store = InMemoryStore::new().with_slots([CapacitySlot::new(1, "old", 4)]);
    let slots = vec![CapacitySlot::new(1, "Comilla", 6), CapacitySlot::new(2, "Mymensingh", 3)];
    store
        .commit(batch(vec![Mutation::ReplaceCapacitySlots {
            slots: slots.clone(),
        }]))
        .unwrap();
    assert_eq!(store.capacity_slots().unwrap(), slots);

    let err = store
        .commit(batch(vec![Mutation::ReplaceCapacitySlots {
            slots: vec![CapacitySlot::new(1, "broken", -1)],
        }]))
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected(_)));
    assert_eq!(store.slots().len(), 2);
}

#[test]
fn test_consume_item_rules() {
    let mut store = InMemoryStore::new().with_items([
        Item::new(1, "water", 2, 3, 3),
        Item::single(2, 1, 1),
    ]);

    store
        .commit(batch(vec![Mutation::ConsumeItem {
            item_id: 1,
            units: 2,
            slot: None,
        }]))
        .unwrap();
    let water = store.item(1).unwrap();
    assert_eq!(water.quantity, 1);
    assert!(!water.consumed);

    store
        .commit(batch(vec![Mutation::ConsumeItem {
            item_id: 2,
            units: 1,
            slot: Some("Comilla".to_string()),
        }]))
        .unwrap();
    let taken = store.item(2).unwrap();
    assert!(taken.consumed);
    assert_eq!(taken.slot.as_deref(), Some("Comilla"));

    let again = store
        .commit(batch(vec![Mutation::ConsumeItem {
            item_id: 2,
            units: 1,
            slot: None,
        }]))
        .unwrap_err();
    assert!(matches!(again, StoreError::Conflict(_)));

    let too_many = store
        .commit(batch(vec![Mutation::ConsumeItem {
            item_id: 1,
            units: 2,
            slot: None,
        }]))
        .unwrap_err();
    assert!(matches!(too_many, StoreError::Rejected(_)));
    assert_eq!(store.item(1).unwrap().quantity, 1);
}

#[test]
fn test_empty_batch_bumps_revision() {
    let mut store = InMemoryStore::new();
    store.commit(CommitBatch::new()).unwrap();
    assert_eq!(store.revision(), 1);
}
