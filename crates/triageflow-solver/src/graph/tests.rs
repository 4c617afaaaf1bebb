//! Tests for the residual graph.

use super::*;

fn site(name: &str) -> NodeId {
    NodeId::site(name)
}

#[test]
fn test_add_edge_creates_reverse_arc() {
    let mut graph = ResidualGraph::new();
    graph.add_edge(site("a"), site("b"), 5).unwrap();

    assert_eq!(graph.capacity(&site("a"), &site("b")), 5);
    assert_eq!(graph.capacity(&site("b"), &site("a")), 0);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);

    let back: Vec<_> = graph.neighbors(&site("b")).collect();
    assert_eq!(back, vec![(&site("a"), 0)]);
}

#[test]
fn test_add_edge_overwrites_forward_capacity() {
    let mut graph = ResidualGraph::new();
    graph.add_edge(site("a"), site("b"), 5).unwrap();
    graph.add_edge(site("a"), site("b"), 2).unwrap();

    assert_eq!(graph.capacity(&site("a"), &site("b")), 2);
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_reverse_capacity_never_lowered() {
    let mut graph = ResidualGraph::new();
    graph.add_edge(site("a"), site("b"), 3).unwrap();
    graph.add_edge(site("b"), site("a"), 7).unwrap();
    // Re-adding the first direction must not reset the second.
    graph.add_edge(site("a"), site("b"), 3).unwrap();

    assert_eq!(graph.capacity(&site("a"), &site("b")), 3);
    assert_eq!(graph.capacity(&site("b"), &site("a")), 7);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_negative_capacity_rejected() {
    let mut graph = ResidualGraph::new();
    let result = graph.add_edge(site("a"), site("b"), -1);

    assert!(matches!(
        result,
        Err(AllocationError::InvalidCapacity { value: -1, .. })
    ));
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_self_loop_rejected() {
    let mut graph = ResidualGraph::new();
    let result = graph.add_edge(site("a"), site("a"), 1);

    assert!(matches!(result, Err(AllocationError::DegenerateRequest(_))));
}

#[test]
fn test_neighbors_in_insertion_order() {
    let mut graph = ResidualGraph::new();
    graph.add_edge(site("s"), site("c"), 1).unwrap();
    graph.add_edge(site("s"), site("a"), 2).unwrap();
    graph.add_edge(site("s"), site("b"), 3).unwrap();

    let order: Vec<_> = graph
        .neighbors(&site("s"))
        .map(|(v, cap)| (v.clone(), cap))
        .collect();
    assert_eq!(
        order,
        vec![(site("c"), 1), (site("a"), 2), (site("b"), 3)]
    );
}

#[test]
fn test_neighbors_of_unknown_node_is_empty() {
    let graph = ResidualGraph::new();
    assert_eq!(graph.neighbors(&site("x")).count(), 0);
}

#[test]
fn test_push_keeps_flow_antisymmetric() {
    let mut graph = ResidualGraph::new();
    graph.add_edge(site("a"), site("b"), 4).unwrap();
    let a = graph.index_of(&site("a")).unwrap();

    graph.push(a, 0, 3);

    assert_eq!(graph.flow(&site("a"), &site("b")), 3);
    assert_eq!(graph.flow(&site("b"), &site("a")), -3);
    assert_eq!(graph.residual(&site("a"), &site("b")), 1);
    assert_eq!(graph.residual(&site("b"), &site("a")), 3);

    let flows = graph.positive_flows();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].amount, 3);

    graph.reset_flow();
    assert_eq!(graph.flow(&site("a"), &site("b")), 0);
    assert!(graph.positive_flows().is_empty());
}

#[test]
fn test_add_node_is_idempotent() {
    let mut graph = ResidualGraph::new();
    let first = graph.add_node(NodeId::Source);
    let second = graph.add_node(NodeId::Source);

    assert_eq!(first, second);
    assert!(graph.contains(&NodeId::Source));
    assert!(graph.is_empty());
}

#[test]
fn test_edges_skip_zero_capacity_reverse_arcs() {
    let mut graph = ResidualGraph::new();
    graph.add_edge(site("a"), site("b"), 2).unwrap();
    graph.add_edge(site("b"), site("c"), 0).unwrap();

    let edges: Vec<_> = graph
        .edges()
        .map(|(u, v, c)| (u.clone(), v.clone(), c))
        .collect();
    assert_eq!(edges, vec![(site("a"), site("b"), 2)]);
    assert_eq!(graph.edge_count(), 1);
}
