//! Greedy knapsack cascade over capacity slots.
//!
//! Slots are processed in ascending id order. Each slot runs one knapsack
//! over the items no earlier slot selected, so the candidate pool only ever
//! shrinks and an item lands in at most one slot.
//!
//! The result is optimal per slot given what is left, not jointly optimal
//! across slots; a different slot order can yield a higher total.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};
use triageflow_core::{AllocationError, CapacitySlot, Item, ItemId, Result};

use crate::knapsack::{KnapsackSolver, Selection};

/// One slot together with what it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSelection {
    pub slot: CapacitySlot,
    pub selection: Selection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    /// Per-slot selections in processing order.
    pub slots: Vec<SlotSelection>,
    /// Running total over all slots.
    pub total_value: i64,
}

impl CascadeOutcome {
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.selection.is_empty())
    }

    /// Ids of every selected item across all slots.
    pub fn selected_items(&self) -> BTreeSet<ItemId> {
        self.slots
            .iter()
            .flat_map(|s| s.selection.item_ids())
            .collect()
    }

    /// Name of the slot that selected `item_id`.
    pub fn slot_of(&self, item_id: ItemId) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.selection.contains(item_id))
            .map(|s| s.slot.name.as_str())
    }
}

/// Runs one knapsack per slot over a shrinking pool.
///
/// # Errors
///
/// Propagates knapsack errors: a negative slot capacity or item field, or
/// a slot above the solver's capacity bound. `InvalidCapacity` when the
/// running total overflows.
pub fn run_cascade(
    solver: &mut KnapsackSolver,
    slots: &[CapacitySlot],
    pool: &[Item],
) -> Result<CascadeOutcome> {
    let mut ordered: Vec<&CapacitySlot> = slots.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut taken: BTreeSet<ItemId> = BTreeSet::new();
    let mut outcome = CascadeOutcome::default();

    for slot in ordered {
        let remaining: Vec<Item> = pool
            .iter()
            .filter(|item| !taken.contains(&item.id))
            .cloned()
            .collect();

        let selection = solver.select(&remaining, slot.capacity)?;
        taken.extend(selection.item_ids());
        outcome.total_value = outcome
            .total_value
            .checked_add(selection.total_value)
            .ok_or_else(|| {
                AllocationError::invalid_capacity(
                    format!("slot {} pushes the cascade total past i64", slot.name),
                    selection.total_value,
                )
            })?;

        info!(
            event = "slot_selected",
            slot = %slot.name,
            capacity = slot.capacity,
            items = selection.picks.len(),
            value = selection.total_value,
        );
        debug!(
            event = "pool_remaining",
            slot = slot.id,
            remaining = pool.len().saturating_sub(taken.len()),
        );

        outcome.slots.push(SlotSelection {
            slot: slot.clone(),
            selection,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests;
