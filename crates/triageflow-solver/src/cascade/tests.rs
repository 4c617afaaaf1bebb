//! Tests for the knapsack cascade.

use std::collections::BTreeSet;

use triageflow_core::{AllocationError, CapacitySlot, Item};
use triageflow_test::random::random_items;
use triageflow_test::{brute_force_best, classic_items};

use super::*;
use crate::knapsack::KnapsackSolver;

fn solver() -> KnapsackSolver {
    KnapsackSolver::new(1_000)
}

#[test]
fn test_second_slot_only_sees_leftovers() {
    let slots = vec![CapacitySlot::new(1, "first", 5), CapacitySlot::new(2, "second", 3)];
    let items = classic_items();

    let outcome = run_cascade(&mut solver(), &slots, &items).unwrap();

    let first = &outcome.slots[0].selection;
    let second = &outcome.slots[1].selection;
    assert_eq!(first.total_value, brute_force_best(&items, 5));
    assert_eq!(first.item_ids().collect::<Vec<_>>(), vec![4]);

    let leftovers: Vec<Item> = items.iter().filter(|i| i.id != 4).cloned().collect();
    assert_eq!(second.total_value, brute_force_best(&leftovers, 3));
    assert_eq!(second.item_ids().collect::<Vec<_>>(), vec![2]);

    assert_eq!(outcome.total_value, 11);
    assert_eq!(outcome.slot_of(4), Some("first"));
    assert_eq!(outcome.slot_of(2), Some("second"));
    assert_eq!(outcome.slot_of(1), None);
}

#[test]
fn test_slots_run_in_ascending_id_order() {
    let slots = vec![CapacitySlot::new(7, "late", 5), CapacitySlot::new(3, "early", 3)];

    let outcome = run_cascade(&mut solver(), &slots, &classic_items()).unwrap();

    assert_eq!(outcome.slots[0].slot.name, "early");
    // Capacity 3 alone takes item 2 first, leaving item 4 for the later slot.
    assert_eq!(outcome.slots[0].selection.item_ids().collect::<Vec<_>>(), vec![2]);
    assert_eq!(outcome.slots[1].selection.item_ids().collect::<Vec<_>>(), vec![4]);
}

#[test]
fn test_exhausted_pool_leaves_later_slots_empty() {
    let slots = vec![CapacitySlot::new(1, "a", 100), CapacitySlot::new(2, "b", 100)];

    let outcome = run_cascade(&mut solver(), &slots, &classic_items()).unwrap();

    assert_eq!(outcome.slots.len(), 2);
    assert_eq!(outcome.slots[0].selection.total_value, 17);
    assert!(outcome.slots[1].selection.is_empty());
    assert_eq!(outcome.total_value, 17);
}

#[test]
fn test_no_slots() {
    let outcome = run_cascade(&mut solver(), &[], &classic_items()).unwrap();
    assert!(outcome.slots.is_empty());
    assert!(outcome.is_empty());
    assert_eq!(outcome.total_value, 0);
}

#[test]
fn test_oversized_slot_fails_the_cascade() {
    let slots = vec![CapacitySlot::new(1, "huge", 5_000)];
    assert!(matches!(
        run_cascade(&mut solver(), &slots, &classic_items()),
        Err(AllocationError::CapacityTooLarge { .. })
    ));
}

#[test]
fn test_total_overflow_fails_the_cascade() {
    let half = i64::MAX / 2 + 1;
    let slots = vec![CapacitySlot::new(1, "first", 1), CapacitySlot::new(2, "second", 1)];
    let pool = vec![Item::single(1, 1, half), Item::single(2, 1, half)];
    assert!(matches!(
        run_cascade(&mut solver(), &slots, &pool),
        Err(AllocationError::InvalidCapacity { value, .. }) if value == half
    ));
}

#[test]
fn test_random_cascades_are_exclusive() {
    for seed in 0..30 {
        let items = random_items(seed, 12, 8, 20, 4);
        let slots: Vec<CapacitySlot> = (1..=4)
            .map(|id| CapacitySlot::new(id, format!("slot-{id}"), (seed as i64 + id as i64 * 5) % 23))
            .collect();

        let outcome = run_cascade(&mut solver(), &slots, &items).unwrap();

        let mut seen = BTreeSet::new();
        for slot in &outcome.slots {
            assert!(slot.selection.total_weight <= slot.slot.capacity, "seed {seed}");
            for id in slot.selection.item_ids() {
                assert!(seen.insert(id), "seed {seed}: item {id} selected twice");
            }
        }
        assert_eq!(
            outcome.total_value,
            outcome.slots.iter().map(|s| s.selection.total_value).sum::<i64>()
        );
    }
}
