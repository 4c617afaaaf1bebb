//! Tests for snapshots and commit batches.

use crate::domain::{BandBeds, Hospital, Item, Patient};
use crate::snapshot::{BedSnapshot, ItemPool};
use crate::store::{CommitBatch, Mutation};

#[test]
fn test_bed_snapshot_sorts_and_drops_assigned() {
    let mut assigned = Patient::new(1, "assigned", 1);
    assigned.hospital_id = Some(10);
    let snapshot = BedSnapshot::new(
        vec![Patient::new(5, "e", 2), assigned, Patient::new(3, "c", 1)],
        vec![
            Hospital::new(20, "b", BandBeds::default()),
            Hospital::new(10, "a", BandBeds::default()),
        ],
        vec![],
    );

    let patient_ids: Vec<_> = snapshot.patients.iter().map(|p| p.id).collect();
    let hospital_ids: Vec<_> = snapshot.hospitals.iter().map(|h| h.id).collect();
    assert_eq!(patient_ids, vec![3, 5]);
    assert_eq!(hospital_ids, vec![10, 20]);
    assert_eq!(snapshot.hospital(20).map(|h| h.name.as_str()), Some("b"));
}

#[test]
fn test_item_pool_excludes_unavailable() {
    let mut consumed = Item::single(1, 2, 3);
    consumed.consumed = true;
    let mut routed = Item::single(2, 2, 3);
    routed.slot = Some("Sylhet".to_string());
    let weightless = Item::single(3, 0, 3);

    let pool = ItemPool::new(vec![
        Item::single(9, 1, 1),
        consumed,
        routed,
        weightless,
        Item::single(4, 1, 1),
    ]);

    let ids: Vec<_> = pool.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![4, 9]);
}

#[test]
fn test_band_beds_get_set() {
    let mut beds = BandBeds::new(1, 2, 3, 4);
    assert_eq!(beds.total(), 10);
    beds.set(crate::Band::Mid, 0);
    assert_eq!(beds.get(crate::Band::Mid), 0);
    assert_eq!(beds.total(), 7);
}

#[test]
fn test_commit_batch_extend() {
    let mut batch = CommitBatch::new();
    assert!(batch.is_empty());
    batch.push(Mutation::AssignPatient {
        patient_id: 1,
        hospital_id: 2,
    });
    batch.extend([Mutation::SetZoneDemand {
        zone_id: 3,
        demand: 0,
    }]);
    assert_eq!(batch.len(), 2);
}
