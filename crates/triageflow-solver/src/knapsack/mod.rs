//! Bounded 0/1 knapsack.
//!
//! Lots with `quantity > 1` are expanded into unit copies that keep a
//! back-reference to their lot, which reduces the bounded problem to the
//! classic 0/1 dynamic program over integer capacities `0..=capacity`.
//!
//! Time and memory are O(units × capacity), so capacities are bounded by
//! [`KnapsackSolver::max_capacity`]. A lot never expands past the copies
//! that fit the capacity together, and weightless lots skip the table
//! entirely, so the unit count is bounded by the capacity as well.
//!
//! Among several optimal subsets the backtrack keeps later units first.
//! Which of two equal-valued lots ends up selected is not part of the
//! contract.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use triageflow_config::KnapsackConfig;
use triageflow_core::{AllocationError, Item, ItemId, Result};

/// One unit of a lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitCopy {
    pub item_id: ItemId,
    pub weight: i64,
    pub value: i64,
}

/// Expands lots into the unit copies that can fit `capacity`, in input order.
///
/// A lot of weight `w` contributes at most `capacity / w` copies. Weightless
/// lots contribute none; [`KnapsackSolver::select`] takes them whole.
///
/// # Errors
///
/// `InvalidCapacity` for a negative weight, value or quantity. A lot with
/// quantity 0 contributes no copies.
pub fn expand(items: &[Item], capacity: i64) -> Result<Vec<UnitCopy>> {
    let mut units = Vec::new();
    for item in items {
        check_lot(item)?;
        if item.weight == 0 {
            continue;
        }
        let copies = item.quantity.min(capacity.max(0) / item.weight);
        let copy = UnitCopy {
            item_id: item.id,
            weight: item.weight,
            value: item.value,
        };
        units.extend(std::iter::repeat(copy).take(copies as usize));
    }
    Ok(units)
}

fn check_lot(item: &Item) -> Result<()> {
    for (field, value) in [
        ("weight", item.weight),
        ("value", item.value),
        ("quantity", item.quantity),
    ] {
        if value < 0 {
            return Err(AllocationError::invalid_capacity(
                format!("item {} {field}", item.id),
                value,
            ));
        }
    }
    Ok(())
}

fn value_overflow(item_id: ItemId, value: i64) -> AllocationError {
    AllocationError::invalid_capacity(
        format!("item {item_id} value overflows the selection total"),
        value,
    )
}

/// Units taken from one lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pick {
    pub item_id: ItemId,
    pub units: i64,
    pub weight: i64,
    pub value: i64,
}

/// Result of one knapsack run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Picks in ascending item id order.
    pub picks: Vec<Pick>,
    pub total_value: i64,
    pub total_weight: i64,
    pub capacity: i64,
}

impl Selection {
    pub fn empty(capacity: i64) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.picks.iter().any(|p| p.item_id == item_id)
    }

    /// Units selected from `item_id`, 0 if none.
    pub fn units(&self, item_id: ItemId) -> i64 {
        self.picks
            .iter()
            .find(|p| p.item_id == item_id)
            .map_or(0, |p| p.units)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.picks.iter().map(|p| p.item_id)
    }
}

/// Dynamic-programming knapsack with a reusable table.
#[derive(Debug)]
pub struct KnapsackSolver {
    max_capacity: i64,
    // (units + 1) rows of (capacity + 1) columns, row-major
    table: Vec<i64>,
}

impl KnapsackSolver {
    pub fn new(max_capacity: i64) -> Self {
        Self {
            max_capacity,
            table: Vec::new(),
        }
    }

    pub fn from_config(config: &KnapsackConfig) -> Self {
        Self::new(config.max_capacity)
    }

    pub fn max_capacity(&self) -> i64 {
        self.max_capacity
    }

    /// Selects the value-maximizing subset of units that fits `capacity`.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` for a negative capacity or a malformed lot,
    /// `CapacityTooLarge` above the configured maximum.
    pub fn select(&mut self, items: &[Item], capacity: i64) -> Result<Selection> {
        if capacity < 0 {
            return Err(AllocationError::invalid_capacity(
                "knapsack capacity",
                capacity,
            ));
        }
        if capacity > self.max_capacity {
            return Err(AllocationError::CapacityTooLarge {
                capacity,
                max: self.max_capacity,
            });
        }

        let units = expand(items, capacity)?;
        let mut picks: BTreeMap<ItemId, Pick> = BTreeMap::new();
        let mut bonus: i64 = 0;

        // Weightless lots always fit, so every valued copy is taken.
        for item in items
            .iter()
            .filter(|i| i.weight == 0 && i.value > 0 && i.quantity > 0)
        {
            let value = item
                .value
                .checked_mul(item.quantity)
                .ok_or_else(|| value_overflow(item.id, item.value))?;
            bonus = bonus
                .checked_add(value)
                .ok_or_else(|| value_overflow(item.id, value))?;
            let pick = picks.entry(item.id).or_insert(Pick {
                item_id: item.id,
                units: 0,
                weight: 0,
                value: 0,
            });
            pick.units += item.quantity;
            pick.value = pick
                .value
                .checked_add(value)
                .ok_or_else(|| value_overflow(item.id, value))?;
        }

        if units.is_empty() && picks.is_empty() {
            return Ok(Selection::empty(capacity));
        }

        let width = capacity as usize + 1;
        let n = units.len();
        self.table.clear();
        self.table.resize((n + 1) * width, 0);

        for (i, unit) in units.iter().enumerate() {
            let (prev, row) = self.table[i * width..(i + 2) * width].split_at_mut(width);
            for w in 0..width {
                let skip = prev[w];
                row[w] = match usize::try_from(unit.weight) {
                    Ok(weight) if weight <= w => {
                        let take = prev[w - weight]
                            .checked_add(unit.value)
                            .ok_or_else(|| value_overflow(unit.item_id, unit.value))?;
                        skip.max(take)
                    }
                    _ => skip,
                };
            }
        }

        // Walk back from the last unit; a changed cell means it was taken.
        let mut w = capacity as usize;
        for i in (1..=n).rev() {
            if self.table[i * width + w] != self.table[(i - 1) * width + w] {
                let unit = units[i - 1];
                let pick = picks.entry(unit.item_id).or_insert(Pick {
                    item_id: unit.item_id,
                    units: 0,
                    weight: 0,
                    value: 0,
                });
                pick.units += 1;
                pick.weight = pick.weight.checked_add(unit.weight).ok_or_else(|| {
                    AllocationError::invalid_capacity("knapsack weight", unit.weight)
                })?;
                pick.value = pick
                    .value
                    .checked_add(unit.value)
                    .ok_or_else(|| value_overflow(unit.item_id, unit.value))?;
                w -= unit.weight as usize;
            }
        }

        let picks: Vec<Pick> = picks.into_values().collect();
        let total_value = self.table[n * width + capacity as usize]
            .checked_add(bonus)
            .ok_or_else(|| AllocationError::invalid_capacity("knapsack total value", bonus))?;
        let total_weight = picks.iter().map(|p| p.weight).sum();
        debug!(
            event = "knapsack",
            units = n,
            capacity,
            total_value,
            total_weight,
        );

        Ok(Selection {
            picks,
            total_value,
            total_weight,
            capacity,
        })
    }
}

impl Default for KnapsackSolver {
    fn default() -> Self {
        Self::from_config(&KnapsackConfig::default())
    }
}

/// Convenience wrapper using the default capacity bound.
pub fn select(items: &[Item], capacity: i64) -> Result<Selection> {
    KnapsackSolver::default().select(items, capacity)
}
