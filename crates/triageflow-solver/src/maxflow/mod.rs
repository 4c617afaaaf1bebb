//! Edmonds–Karp maximum flow.
//!
//! Repeatedly finds a shortest augmenting path by breadth-first search over
//! arcs with positive residual capacity, pushes the bottleneck along it and
//! stops when the sink is no longer reachable. Worst case is O(V·E²), which
//! is fine for graphs bounded by entity counts.
//!
//! # Example
//!
//! ```
//! use triageflow_core::{EntityRef, NodeId};
//! use triageflow_solver::graph::ResidualGraph;
//! use triageflow_solver::maxflow::EdmondsKarp;
//!
//! let d1 = NodeId::demand(EntityRef::patient(1));
//! let d2 = NodeId::demand(EntityRef::patient(2));
//! let s1 = NodeId::supply(EntityRef::hospital(1));
//!
//! let mut graph = ResidualGraph::new();
//! graph.add_edge(NodeId::Source, d1.clone(), 1).unwrap();
//! graph.add_edge(NodeId::Source, d2.clone(), 1).unwrap();
//! graph.add_edge(d1, s1.clone(), 1).unwrap();
//! graph.add_edge(d2, s1.clone(), 1).unwrap();
//! graph.add_edge(s1, NodeId::Sink, 1).unwrap();
//!
//! let result = EdmondsKarp::new()
//!     .solve(&mut graph, &NodeId::Source, &NodeId::Sink)
//!     .unwrap();
//! assert_eq!(result.value, 1);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::trace;
use triageflow_core::{AllocationError, NodeId, Result};

use crate::graph::{EdgeFlow, ResidualGraph};

/// Counters for a single solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Augmenting paths pushed.
    pub augmenting_paths: u64,
    /// Nodes dequeued across all searches.
    pub nodes_visited: u64,
    pub elapsed: Duration,
}

/// Result of a completed solve.
#[derive(Debug, Clone)]
pub struct MaxFlow {
    pub source: NodeId,
    pub sink: NodeId,
    /// Total flow from source to sink.
    pub value: i64,
    /// Every arc with strictly positive flow.
    pub flows: Vec<EdgeFlow>,
    pub stats: SolveStats,
}

impl MaxFlow {
    /// Flow leaving `node`, summed over positive arcs.
    pub fn outflow(&self, node: &NodeId) -> i64 {
        self.flows
            .iter()
            .filter(|f| &f.from == node)
            .map(|f| f.amount)
            .sum()
    }

    /// Flow entering `node`, summed over positive arcs.
    pub fn inflow(&self, node: &NodeId) -> i64 {
        self.flows
            .iter()
            .filter(|f| &f.to == node)
            .map(|f| f.amount)
            .sum()
    }

    /// Positive flows that leave the source or enter the sink.
    pub fn terminal_flows(&self) -> impl Iterator<Item = &EdgeFlow> {
        self.flows
            .iter()
            .filter(|f| f.from == self.source || f.to == self.sink)
    }
}

/// Edmonds–Karp solver with reusable search buffers.
#[derive(Debug, Default)]
pub struct EdmondsKarp {
    // (predecessor node, arc position in predecessor)
    parent: Vec<Option<(usize, usize)>>,
    visited: Vec<bool>,
    queue: VecDeque<usize>,
}

impl EdmondsKarp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a maximum flow from `source` to `sink`.
    ///
    /// Any flow left in `graph` by an earlier solve is cleared first, so
    /// re-solving an unchanged graph yields the same value.
    ///
    /// # Errors
    ///
    /// `DegenerateRequest` if `source == sink`; `UnknownNode` if either
    /// terminal was never added to the graph. An unreachable sink is not an
    /// error and yields a zero flow.
    pub fn solve(
        &mut self,
        graph: &mut ResidualGraph,
        source: &NodeId,
        sink: &NodeId,
    ) -> Result<MaxFlow> {
        if source == sink {
            return Err(AllocationError::DegenerateRequest(format!(
                "source and sink are both {source}"
            )));
        }
        let s = graph
            .index_of(source)
            .ok_or_else(|| AllocationError::UnknownNode(source.to_string()))?;
        let t = graph
            .index_of(sink)
            .ok_or_else(|| AllocationError::UnknownNode(sink.to_string()))?;

        let started = Instant::now();
        let mut stats = SolveStats::default();
        let mut value: i64 = 0;
        graph.reset_flow();

        while self.search(graph, s, t, &mut stats) {
            let mut bottleneck = i64::MAX;
            let mut v = t;
            while let Some((u, pos)) = self.parent[v] {
                bottleneck = bottleneck.min(graph.arcs_of(u)[pos].residual());
                v = u;
            }

            let mut v = t;
            let mut hops = 0usize;
            while let Some((u, pos)) = self.parent[v] {
                graph.push(u, pos, bottleneck);
                v = u;
                hops += 1;
            }

            value = value.checked_add(bottleneck).ok_or_else(|| {
                AllocationError::FlowInvariant("total flow overflows i64".to_string())
            })?;
            stats.augmenting_paths += 1;
            trace!(event = "augment", hops, bottleneck, value);
        }

        stats.elapsed = started.elapsed();
        Ok(MaxFlow {
            source: source.clone(),
            sink: sink.clone(),
            value,
            flows: graph.positive_flows(),
            stats,
        })
    }

    // Breadth-first search for a shortest augmenting path. Fills `parent`
    // and returns true when the sink was reached.
    fn search(
        &mut self,
        graph: &ResidualGraph,
        s: usize,
        t: usize,
        stats: &mut SolveStats,
    ) -> bool {
        let n = graph.node_count();
        self.parent.clear();
        self.parent.resize(n, None);
        self.visited.clear();
        self.visited.resize(n, false);
        self.queue.clear();

        self.visited[s] = true;
        self.queue.push_back(s);

        while let Some(u) = self.queue.pop_front() {
            stats.nodes_visited += 1;
            for (pos, arc) in graph.arcs_of(u).iter().enumerate() {
                if self.visited[arc.to] || arc.residual() <= 0 {
                    continue;
                }
                self.visited[arc.to] = true;
                self.parent[arc.to] = Some((u, pos));
                if arc.to == t {
                    return true;
                }
                self.queue.push_back(arc.to);
            }
        }
        false
    }
}

/// Convenience wrapper around [`EdmondsKarp::solve`].
pub fn max_flow(graph: &mut ResidualGraph, source: &NodeId, sink: &NodeId) -> Result<MaxFlow> {
    EdmondsKarp::new().solve(graph, source, sink)
}
