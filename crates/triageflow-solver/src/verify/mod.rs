//! Post-solve verification of a flow.
//!
//! Checks capacity respect, antisymmetry and conservation, and derives the
//! minimum cut from reachability in the final residual graph. A maximum
//! flow's value equals the capacity of that cut.

use std::collections::VecDeque;

use triageflow_core::{AllocationError, NodeId, Result};

use crate::graph::ResidualGraph;

/// A source–sink cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinCut {
    /// Nodes reachable from the source through positive residual arcs.
    pub source_side: Vec<NodeId>,
    /// Sum of capacities of arcs leaving the source side.
    pub capacity: i64,
}

impl MinCut {
    pub fn contains(&self, node: &NodeId) -> bool {
        self.source_side.contains(node)
    }
}

/// Computes the cut induced by residual reachability from `source`.
pub fn min_cut(graph: &ResidualGraph, source: &NodeId) -> Result<MinCut> {
    let s = graph
        .index_of(source)
        .ok_or_else(|| AllocationError::UnknownNode(source.to_string()))?;

    let n = graph.node_count();
    let mut reachable = vec![false; n];
    let mut queue = VecDeque::from([s]);
    reachable[s] = true;
    while let Some(u) = queue.pop_front() {
        for arc in graph.arcs_of(u) {
            if !reachable[arc.to] && arc.residual() > 0 {
                reachable[arc.to] = true;
                queue.push_back(arc.to);
            }
        }
    }

    let mut capacity = 0i64;
    let mut source_side = Vec::new();
    for u in (0..n).filter(|&u| reachable[u]) {
        source_side.push(graph.node_at(u).clone());
        capacity += graph
            .arcs_of(u)
            .iter()
            .filter(|a| !reachable[a.to])
            .map(|a| a.capacity)
            .sum::<i64>();
    }

    Ok(MinCut {
        source_side,
        capacity,
    })
}

/// Verifies that the flow stored in `graph` is a valid maximum flow of
/// `value` from `source` to `sink`, returning the witnessing cut.
///
/// # Errors
///
/// `FlowInvariant` naming the first violated property.
pub fn verify_flow(
    graph: &ResidualGraph,
    source: &NodeId,
    sink: &NodeId,
    value: i64,
) -> Result<MinCut> {
    let s = graph
        .index_of(source)
        .ok_or_else(|| AllocationError::UnknownNode(source.to_string()))?;
    let t = graph
        .index_of(sink)
        .ok_or_else(|| AllocationError::UnknownNode(sink.to_string()))?;

    for u in 0..graph.node_count() {
        let mut net = 0i64;
        for arc in graph.arcs_of(u) {
            if arc.flow > arc.capacity {
                return Err(AllocationError::FlowInvariant(format!(
                    "flow {} exceeds capacity {} on {} -> {}",
                    arc.flow,
                    arc.capacity,
                    graph.node_at(u),
                    graph.node_at(arc.to)
                )));
            }
            let paired = &graph.arcs_of(arc.to)[arc.rev];
            if paired.flow != -arc.flow {
                return Err(AllocationError::FlowInvariant(format!(
                    "flow on {} -> {} is not antisymmetric",
                    graph.node_at(u),
                    graph.node_at(arc.to)
                )));
            }
            net += arc.flow;
        }

        let expected = if u == s {
            value
        } else if u == t {
            -value
        } else {
            0
        };
        if net != expected {
            return Err(AllocationError::FlowInvariant(format!(
                "net outflow of {} is {net}, expected {expected}",
                graph.node_at(u)
            )));
        }
    }

    let cut = min_cut(graph, source)?;
    if cut.contains(sink) {
        return Err(AllocationError::FlowInvariant(format!(
            "{sink} still reachable from {source}; flow is not maximal"
        )));
    }
    if cut.capacity != value {
        return Err(AllocationError::FlowInvariant(format!(
            "cut capacity {} differs from flow value {value}",
            cut.capacity
        )));
    }
    Ok(cut)
}

#[cfg(test)]
mod tests;
