//! Tests for flow verification and minimum cuts.

use triageflow_core::{AllocationError, NodeId};

use super::*;
use crate::graph::ResidualGraph;
use crate::maxflow::max_flow;

fn chain() -> ResidualGraph {
    let mut graph = ResidualGraph::new();
    graph
        .add_edge(NodeId::site("s"), NodeId::site("m"), 5)
        .unwrap();
    graph
        .add_edge(NodeId::site("m"), NodeId::site("t"), 3)
        .unwrap();
    graph
}

#[test]
fn test_min_cut_of_bottleneck_chain() {
    let mut graph = chain();
    let (s, t) = (NodeId::site("s"), NodeId::site("t"));
    let result = max_flow(&mut graph, &s, &t).unwrap();

    let cut = verify_flow(&graph, &s, &t, result.value).unwrap();
    assert_eq!(result.value, 3);
    assert_eq!(cut.capacity, 3);
    assert_eq!(cut.source_side, vec![s, NodeId::site("m")]);
}

#[test]
fn test_min_cut_before_solve_is_full_outgoing_capacity() {
    let graph = chain();
    let cut = min_cut(&graph, &NodeId::site("s")).unwrap();
    // Every node is reachable while no flow has been pushed.
    assert_eq!(cut.source_side.len(), 3);
    assert_eq!(cut.capacity, 0);
}

#[test]
fn test_non_maximal_flow_detected() {
    let graph = chain();
    let result = verify_flow(&graph, &NodeId::site("s"), &NodeId::site("t"), 0);
    assert!(matches!(result, Err(AllocationError::FlowInvariant(_))));
}

#[test]
fn test_wrong_value_detected() {
    let mut graph = chain();
    let (s, t) = (NodeId::site("s"), NodeId::site("t"));
    max_flow(&mut graph, &s, &t).unwrap();

    let result = verify_flow(&graph, &s, &t, 4);
    assert!(matches!(result, Err(AllocationError::FlowInvariant(_))));
}

#[test]
fn test_conservation_violation_detected() {
    let mut graph = chain();
    let s = graph.index_of(&NodeId::site("s")).unwrap();
    // Push on the first arc only, leaving m unbalanced.
    graph.push(s, 0, 2);

    let result = verify_flow(&graph, &NodeId::site("s"), &NodeId::site("t"), 2);
    assert!(matches!(result, Err(AllocationError::FlowInvariant(ref m)) if m.contains("net outflow")));
}

#[test]
fn test_capacity_violation_detected() {
    let mut graph = chain();
    let s = graph.index_of(&NodeId::site("s")).unwrap();
    graph.push(s, 0, 6);

    let result = verify_flow(&graph, &NodeId::site("s"), &NodeId::site("t"), 6);
    assert!(matches!(result, Err(AllocationError::FlowInvariant(ref m)) if m.contains("exceeds capacity")));
}

#[test]
fn test_unknown_source() {
    let graph = chain();
    assert!(matches!(
        min_cut(&graph, &NodeId::Source),
        Err(AllocationError::UnknownNode(_))
    ));
}
