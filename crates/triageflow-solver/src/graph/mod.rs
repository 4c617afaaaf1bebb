//! Directed capacitated graph with explicit residual bookkeeping.
//!
//! Every edge added with [`ResidualGraph::add_edge`] is stored together with
//! its reverse arc. The pair shares one antisymmetric flow value, so
//! `flow(u, v) == -flow(v, u)` holds by construction and pushing flow
//! forward cancels it on the reverse arc.
//!
//! # Example
//!
//! ```
//! use triageflow_core::NodeId;
//! use triageflow_solver::graph::ResidualGraph;
//!
//! let a = NodeId::site("a");
//! let b = NodeId::site("b");
//!
//! let mut graph = ResidualGraph::new();
//! graph.add_edge(a.clone(), b.clone(), 4).unwrap();
//!
//! assert_eq!(graph.capacity(&a, &b), 4);
//! assert_eq!(graph.capacity(&b, &a), 0);
//! let residuals: Vec<_> = graph.neighbors(&a).collect();
//! assert_eq!(residuals, vec![(&b, 4)]);
//! ```

use std::collections::HashMap;

use triageflow_core::{AllocationError, NodeId, Result};

/// One direction of an edge pair.
#[derive(Debug, Clone)]
pub(crate) struct Arc {
    pub(crate) to: usize,
    pub(crate) capacity: i64,
    pub(crate) flow: i64,
    /// Position of the paired arc in `arcs[to]`.
    pub(crate) rev: usize,
}

impl Arc {
    pub(crate) fn residual(&self) -> i64 {
        self.capacity - self.flow
    }
}

/// A positive flow on one arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFlow {
    pub from: NodeId,
    pub to: NodeId,
    pub amount: i64,
}

/// Capacitated graph with implicit reverse edges.
///
/// Nodes and arcs are kept in insertion order, which makes neighbor
/// iteration, and therefore augmenting-path choice, reproducible.
#[derive(Debug, Clone, Default)]
pub struct ResidualGraph {
    nodes: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    arcs: Vec<Vec<Arc>>,
    // target node -> position in arcs[source]
    positions: Vec<HashMap<usize, usize>>,
    edge_count: usize,
}

impl ResidualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node without edges and returns its index.
    ///
    /// Builders register the super source and sink up front so an empty
    /// scenario still solves to zero instead of failing with `UnknownNode`.
    pub fn add_node(&mut self, node: NodeId) -> usize {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.clone(), idx);
        self.nodes.push(node);
        self.arcs.push(Vec::new());
        self.positions.push(HashMap::new());
        idx
    }

    /// Inserts or overwrites the forward capacity from `u` to `v`.
    ///
    /// A reverse arc with capacity 0 is created if the pair is new. An
    /// existing reverse capacity is never lowered.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` for a negative capacity, `DegenerateRequest` for a
    /// self-loop.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, capacity: i64) -> Result<()> {
        if capacity < 0 {
            return Err(AllocationError::invalid_capacity(
                format!("edge {u} -> {v}"),
                capacity,
            ));
        }
        if u == v {
            return Err(AllocationError::DegenerateRequest(format!(
                "self-loop on {u}"
            )));
        }

        let ui = self.add_node(u);
        let vi = self.add_node(v);

        if let Some(&pos) = self.positions[ui].get(&vi) {
            let arc = &mut self.arcs[ui][pos];
            if arc.capacity == 0 && capacity > 0 {
                self.edge_count += 1;
            } else if arc.capacity > 0 && capacity == 0 {
                self.edge_count -= 1;
            }
            arc.capacity = capacity;
            return Ok(());
        }

        let forward_pos = self.arcs[ui].len();
        let reverse_pos = self.arcs[vi].len();
        self.arcs[ui].push(Arc {
            to: vi,
            capacity,
            flow: 0,
            rev: reverse_pos,
        });
        self.arcs[vi].push(Arc {
            to: ui,
            capacity: 0,
            flow: 0,
            rev: forward_pos,
        });
        self.positions[ui].insert(vi, forward_pos);
        self.positions[vi].insert(ui, reverse_pos);
        if capacity > 0 {
            self.edge_count += 1;
        }
        Ok(())
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.index.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of arcs with positive capacity.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Capacity of the arc `u -> v`, 0 if absent.
    pub fn capacity(&self, u: &NodeId, v: &NodeId) -> i64 {
        self.arc(u, v).map_or(0, |a| a.capacity)
    }

    /// Flow on the arc `u -> v`, negative when flow runs `v -> u`.
    pub fn flow(&self, u: &NodeId, v: &NodeId) -> i64 {
        self.arc(u, v).map_or(0, |a| a.flow)
    }

    pub fn residual(&self, u: &NodeId, v: &NodeId) -> i64 {
        self.arc(u, v).map_or(0, Arc::residual)
    }

    /// Lazily yields `(v, residual_capacity)` for every arc leaving `u`, in
    /// insertion order. Unknown nodes have no neighbors.
    pub fn neighbors<'a>(&'a self, u: &NodeId) -> impl Iterator<Item = (&'a NodeId, i64)> + 'a {
        self.index
            .get(u)
            .into_iter()
            .flat_map(move |&ui| self.arcs[ui].iter())
            .map(move |arc| (&self.nodes[arc.to], arc.residual()))
    }

    /// Arcs with positive capacity as `(from, to, capacity)`.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeId, &NodeId, i64)> {
        self.arcs.iter().enumerate().flat_map(move |(ui, arcs)| {
            arcs.iter()
                .filter(|a| a.capacity > 0)
                .map(move |a| (&self.nodes[ui], &self.nodes[a.to], a.capacity))
        })
    }

    /// Arcs carrying strictly positive flow, in deterministic order.
    pub fn positive_flows(&self) -> Vec<EdgeFlow> {
        let mut flows = Vec::new();
        for (ui, arcs) in self.arcs.iter().enumerate() {
            for arc in arcs.iter().filter(|a| a.flow > 0) {
                flows.push(EdgeFlow {
                    from: self.nodes[ui].clone(),
                    to: self.nodes[arc.to].clone(),
                    amount: arc.flow,
                });
            }
        }
        flows
    }

    /// Clears all flow, keeping capacities.
    pub fn reset_flow(&mut self) {
        for arcs in &mut self.arcs {
            for arc in arcs.iter_mut() {
                arc.flow = 0;
            }
        }
    }

    // ---- index-level access for the solver and verification ----

    pub(crate) fn index_of(&self, node: &NodeId) -> Option<usize> {
        self.index.get(node).copied()
    }

    pub(crate) fn node_at(&self, idx: usize) -> &NodeId {
        &self.nodes[idx]
    }

    pub(crate) fn arcs_of(&self, idx: usize) -> &[Arc] {
        &self.arcs[idx]
    }

    /// Pushes `amount` along `arcs[u][pos]` and cancels it on the pair.
    pub(crate) fn push(&mut self, u: usize, pos: usize, amount: i64) {
        let (to, rev) = {
            let arc = &mut self.arcs[u][pos];
            arc.flow += amount;
            (arc.to, arc.rev)
        };
        self.arcs[to][rev].flow -= amount;
    }

    fn arc(&self, u: &NodeId, v: &NodeId) -> Option<&Arc> {
        let ui = *self.index.get(u)?;
        let vi = *self.index.get(v)?;
        let pos = *self.positions[ui].get(&vi)?;
        Some(&self.arcs[ui][pos])
    }
}

#[cfg(test)]
mod tests;
