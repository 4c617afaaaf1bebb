//! Seeded generators for property tests.
//!
//! # Example
//!
//! ```
//! use triageflow_test::random::random_edges;
//!
//! let a = random_edges(7, 6, 0.5, 10);
//! let b = random_edges(7, 6, 0.5, 10);
//! assert_eq!(a, b);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use triageflow_core::{Item, NodeId};

/// Name of the `i`-th generated site.
pub fn site(i: usize) -> NodeId {
    NodeId::site(format!("n{i}"))
}

/// Random directed edges over sites `n0..n{nodes}`, without self-loops.
///
/// Each ordered pair is present with probability `density`; capacities
/// are drawn from `0..=max_capacity`. Use `site(0)` as source and
/// `site(nodes - 1)` as sink.
pub fn random_edges(
    seed: u64,
    nodes: usize,
    density: f64,
    max_capacity: i64,
) -> Vec<(NodeId, NodeId, i64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for u in 0..nodes {
        for v in 0..nodes {
            if u != v && rng.random_bool(density) {
                edges.push((site(u), site(v), rng.random_range(0..=max_capacity)));
            }
        }
    }
    edges
}

/// Random item lots with ids `1..=count`.
pub fn random_items(
    seed: u64,
    count: usize,
    max_weight: i64,
    max_value: i64,
    max_quantity: i64,
) -> Vec<Item> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (1..=count as u64)
        .map(|id| {
            Item::new(
                id,
                format!("lot-{id}"),
                rng.random_range(1..=max_weight),
                rng.random_range(0..=max_value),
                rng.random_range(1..=max_quantity),
            )
        })
        .collect()
}
