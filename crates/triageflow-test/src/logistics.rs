//! Supply center, zone and route network fixtures.

use triageflow_core::{DisasterZone, RouteLink, SupplyCenter, TransportRoute};

pub fn center(id: u64, total_stock: i64) -> SupplyCenter {
    SupplyCenter {
        id,
        name: format!("center-{id}"),
        total_stock,
    }
}

pub fn zone(id: u64, demand: i64) -> DisasterZone {
    DisasterZone {
        id,
        name: format!("zone-{id}"),
        demand,
    }
}

/// A route with no previously sent amount.
pub fn route(id: u64, center_id: u64, zone_id: u64, send_limit: i64) -> TransportRoute {
    TransportRoute {
        id,
        center_id,
        zone_id,
        send_limit,
        amount_sent: None,
    }
}

pub fn link(id: u64, from: &str, to: &str, max_capacity: i64) -> RouteLink {
    RouteLink {
        id,
        from: from.to_string(),
        to: to.to_string(),
        max_capacity,
    }
}

/// A small road network: Dhaka feeds Comilla and Mymensingh, both reach
/// Chittagong.
///
/// With bidirectional links the maximum flow from Dhaka to Chittagong is 9
/// (6 via Comilla, 3 via Mymensingh).
pub fn bangladesh_network() -> Vec<RouteLink> {
    vec![
        link(1, "Dhaka", "Comilla", 8),
        link(2, "Dhaka", "Mymensingh", 5),
        link(3, "Comilla", "Chittagong", 6),
        link(4, "Mymensingh", "Chittagong", 3),
        link(5, "Comilla", "Mymensingh", 2),
    ]
}
