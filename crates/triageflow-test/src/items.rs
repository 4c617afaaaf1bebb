//! Item fixtures and a brute-force knapsack oracle.

use triageflow_core::Item;

/// Items `(w=1,v=1) (w=3,v=4) (w=4,v=5) (w=5,v=7)`, ids 1..=4.
///
/// At capacity 7 the optimum is 9 (weights 3 and 4).
pub fn classic_items() -> Vec<Item> {
    vec![
        Item::single(1, 1, 1),
        Item::single(2, 3, 4),
        Item::single(3, 4, 5),
        Item::single(4, 5, 7),
    ]
}

/// Best achievable value by exhaustive enumeration of unit copies.
///
/// Only suitable for small instances (at most ~20 expanded units).
pub fn brute_force_best(items: &[Item], capacity: i64) -> i64 {
    let units: Vec<(i64, i64)> = items
        .iter()
        .flat_map(|i| std::iter::repeat((i.weight, i.value)).take(i.quantity.max(0) as usize))
        .collect();
    assert!(units.len() <= 20, "brute force limited to 20 units");

    let mut best = 0;
    for mask in 0u32..(1u32 << units.len()) {
        let (mut weight, mut value) = (0, 0);
        for (bit, (w, v)) in units.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                weight += w;
                value += v;
            }
        }
        if weight <= capacity {
            best = best.max(value);
        }
    }
    best
}
