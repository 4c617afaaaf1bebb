//! End-to-end allocation runs against a store.
//!
//! Every run reads a snapshot, builds a fresh graph, solves, extracts and
//! hands one [`CommitBatch`] to the store. No graph or flow state survives
//! a run. Runs are synchronous; callers must not start two runs against
//! the same store concurrently.

mod report;

use std::collections::BTreeMap;

use tracing::info;
use triageflow_config::EngineConfig;
use triageflow_core::{
    AllocationError, AllocationStore, BedSnapshot, CommitBatch, EntityKind, ItemPool, Mutation,
    NetworkSnapshot, NodeId, Result, StockSnapshot,
};

use crate::builder::{bed_assignment_graph, route_network_graph, stock_distribution_graph};
use crate::cascade::{run_cascade, CascadeOutcome};
use crate::extract::{
    extract, settle_placements, slots_from_assignments, slots_from_source, Assignment,
};
use crate::graph::ResidualGraph;
use crate::knapsack::KnapsackSolver;
use crate::maxflow::{EdmondsKarp, MaxFlow};
use crate::verify::verify_flow;

pub use report::{
    BedAllocationReport, BedUsage, CenterLevel, KitReport, RouteCapacityReport, Shipment,
    SolveSummary, SupplyChainReport, SupplyReport, TransportReport, ZoneLevel,
};

/// Drives the allocation scenarios over an [`AllocationStore`].
///
/// # Example
///
/// ```ignore
/// let mut engine = AllocationEngine::new(store);
/// let report = engine.allocate_beds()?;
/// println!("placed {} patients", report.placements.len());
/// ```
pub struct AllocationEngine<S: AllocationStore> {
    store: S,
    config: EngineConfig,
    maxflow: EdmondsKarp,
    knapsack: KnapsackSolver,
}

impl<S: AllocationStore> AllocationEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        let knapsack = KnapsackSolver::from_config(&config.knapsack);
        Self {
            store,
            config,
            maxflow: EdmondsKarp::new(),
            knapsack,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Assigns unassigned patients to hospital beds of their own band.
    ///
    /// Commits one `AssignPatient` per placed patient and the new bed count
    /// of every band that lost beds.
    pub fn allocate_beds(&mut self) -> Result<BedAllocationReport> {
        let snapshot = BedSnapshot::read(&self.store)?;
        info!(
            event = "run_start",
            scenario = "beds",
            patients = snapshot.patients.len(),
            hospitals = snapshot.hospitals.len(),
            transfers = snapshot.transfers.len(),
        );

        let mut graph = bed_assignment_graph(&snapshot)?;
        let flow = self.solve(&mut graph, &NodeId::Source, &NodeId::Sink, "beds")?;
        let extraction = extract(&flow)?;
        let placements = settle_placements(&flow, &extraction)?;

        let mut bed_usage = Vec::new();
        for f in flow.flows.iter().filter(|f| f.to == NodeId::Sink) {
            let NodeId::Supply(hospital, Some(band)) = &f.from else {
                continue;
            };
            let available = snapshot
                .hospital(hospital.id)
                .map_or(0, |h| h.beds.get(*band));
            bed_usage.push(BedUsage {
                hospital_id: hospital.id,
                band: *band,
                used: f.amount,
                remaining: available - f.amount,
            });
        }
        bed_usage.sort_by_key(|u| (u.hospital_id, u.band));

        let unplaced = snapshot
            .patients
            .iter()
            .map(|p| p.id)
            .filter(|id| !placements.iter().any(|pl| pl.patient_id == *id))
            .collect();

        let mut batch = CommitBatch::new();
        batch.extend(placements.iter().map(|p| Mutation::AssignPatient {
            patient_id: p.patient_id,
            hospital_id: p.hospital_id,
        }));
        batch.extend(bed_usage.iter().map(|u| Mutation::SetHospitalBeds {
            hospital_id: u.hospital_id,
            band: u.band,
            available: u.remaining,
        }));
        let committed = self.commit(batch, "beds")?;

        info!(
            event = "run_end",
            scenario = "beds",
            placed = placements.len(),
            value = flow.value,
            committed,
        );
        Ok(BedAllocationReport {
            solve: SolveSummary::from(&flow),
            placements,
            transfers: extraction.transfers,
            bed_usage,
            unplaced,
            committed,
        })
    }

    /// Routes center stock to zone demand.
    ///
    /// Commits decremented stock and demand and the amount sent per route.
    pub fn allocate_transport(&mut self) -> Result<TransportReport> {
        let (report, batch, _) = self.plan_transport()?;
        let committed = self.commit(batch, "transport")?;
        info!(
            event = "run_end",
            scenario = "transport",
            value = report.solve.value,
            committed,
        );
        Ok(TransportReport { committed, ..report })
    }

    /// Stage one of the route network: turns the flow leaving `source`
    /// into one capacity slot per neighbor and replaces the stored slots.
    ///
    /// # Errors
    ///
    /// `UnknownNode` if either site is not an endpoint of any route link,
    /// `DegenerateRequest` if both name the same site.
    pub fn plan_route_capacities(&mut self, source: &str, sink: &str) -> Result<RouteCapacityReport> {
        let snapshot = NetworkSnapshot::read(&self.store)?;
        info!(
            event = "run_start",
            scenario = "network",
            links = snapshot.links.len(),
            source,
            sink,
        );

        let mut graph = route_network_graph(&snapshot, self.config.network.bidirectional)?;
        let flow = self.solve(
            &mut graph,
            &NodeId::site(source),
            &NodeId::site(sink),
            "network",
        )?;
        let extraction = extract(&flow)?;
        let slots = slots_from_source(&flow);

        let mut batch = CommitBatch::new();
        batch.push(Mutation::ReplaceCapacitySlots {
            slots: slots.clone(),
        });
        let committed = self.commit(batch, "network")?;

        info!(
            event = "run_end",
            scenario = "network",
            slots = slots.len(),
            value = flow.value,
            committed,
        );
        Ok(RouteCapacityReport {
            source: source.to_string(),
            sink: sink.to_string(),
            solve: SolveSummary::from(&flow),
            slots,
            site_flows: extraction.site_flows,
            committed,
        })
    }

    /// Stage two of the route network: cascades the knapsack over the
    /// stored capacity slots and marks the selected items consumed.
    pub fn optimize_supplies(&mut self) -> Result<SupplyReport> {
        let slots = self
            .store
            .capacity_slots()
            .map_err(AllocationError::Store)?;
        let pool = ItemPool::read(&self.store)?;
        info!(
            event = "run_start",
            scenario = "supplies",
            slots = slots.len(),
            items = pool.len(),
        );

        let cascade = run_cascade(&mut self.knapsack, &slots, &pool.items)?;
        let committed = self.commit(consume_batch(&cascade), "supplies")?;

        info!(
            event = "run_end",
            scenario = "supplies",
            value = cascade.total_value,
            committed,
        );
        Ok(SupplyReport { cascade, committed })
    }

    /// Packs a single kit from the item pool.
    ///
    /// Uses `knapsack.default_kit_capacity` when `capacity` is `None`.
    pub fn optimize_kit(&mut self, capacity: Option<i64>) -> Result<KitReport> {
        let capacity = capacity.unwrap_or(self.config.knapsack.default_kit_capacity);
        let pool = ItemPool::read(&self.store)?;
        info!(
            event = "run_start",
            scenario = "kit",
            capacity,
            items = pool.len(),
        );

        let selection = self.knapsack.select(&pool.items, capacity)?;
        let mut batch = CommitBatch::new();
        batch.extend(selection.picks.iter().map(|p| Mutation::ConsumeItem {
            item_id: p.item_id,
            units: p.units,
            slot: None,
        }));
        let committed = self.commit(batch, "kit")?;

        info!(
            event = "run_end",
            scenario = "kit",
            value = selection.total_value,
            committed,
        );
        Ok(KitReport {
            selection,
            committed,
        })
    }

    /// Runs transport, derives one slot per routed center and zone pair,
    /// cascades the knapsack over them and commits everything at once.
    pub fn run_supply_chain(&mut self) -> Result<SupplyChainReport> {
        let (transport, mut batch, routed) = self.plan_transport()?;
        let slots = slots_from_assignments(&routed);

        let pool = ItemPool::read(&self.store)?;
        let cascade = run_cascade(&mut self.knapsack, &slots, &pool.items)?;

        batch.push(Mutation::ReplaceCapacitySlots {
            slots: slots.clone(),
        });
        batch.extend(consume_batch(&cascade).mutations);
        let committed = self.commit(batch, "supply_chain")?;

        info!(
            event = "run_end",
            scenario = "supply_chain",
            value = cascade.total_value,
            committed,
        );
        Ok(SupplyChainReport {
            transport: TransportReport {
                committed,
                ..transport
            },
            slots,
            cascade,
            committed,
        })
    }

    // Reads, solves and extracts the transport scenario without committing.
    // Also returns the routed center-to-zone assignments.
    fn plan_transport(&mut self) -> Result<(TransportReport, CommitBatch, Vec<Assignment>)> {
        let snapshot = StockSnapshot::read(&self.store)?;
        info!(
            event = "run_start",
            scenario = "transport",
            centers = snapshot.centers.len(),
            zones = snapshot.zones.len(),
            routes = snapshot.routes.len(),
        );

        let mut graph =
            stock_distribution_graph(&snapshot, self.config.transport.route_capacity)?;
        let flow = self.solve(&mut graph, &NodeId::Source, &NodeId::Sink, "transport")?;
        let extraction = extract(&flow)?;

        let mut shipped: BTreeMap<u64, i64> = BTreeMap::new();
        let mut received: BTreeMap<u64, i64> = BTreeMap::new();
        let mut shipments = Vec::new();
        let routed: Vec<Assignment> = extraction
            .assignments
            .into_iter()
            .filter(|a| a.supply.kind == EntityKind::SupplyCenter && a.demand.kind == EntityKind::Zone)
            .collect();
        for a in &routed {
            *shipped.entry(a.supply.id).or_default() += a.amount;
            *received.entry(a.demand.id).or_default() += a.amount;
            shipments.push(Shipment {
                center_id: a.supply.id,
                zone_id: a.demand.id,
                amount: a.amount,
            });
        }
        shipments.sort_by_key(|s| (s.center_id, s.zone_id));

        let centers: Vec<CenterLevel> = snapshot
            .centers
            .iter()
            .filter_map(|c| {
                shipped.get(&c.id).map(|&amount| CenterLevel {
                    center_id: c.id,
                    shipped: amount,
                    remaining: c.total_stock - amount,
                })
            })
            .collect();
        let zones: Vec<ZoneLevel> = snapshot
            .zones
            .iter()
            .filter_map(|z| {
                received.get(&z.id).map(|&amount| ZoneLevel {
                    zone_id: z.id,
                    received: amount,
                    remaining: z.demand - amount,
                })
            })
            .collect();

        let mut batch = CommitBatch::new();
        batch.extend(centers.iter().map(|c| Mutation::SetCenterStock {
            center_id: c.center_id,
            total_stock: c.remaining,
        }));
        batch.extend(zones.iter().map(|z| Mutation::SetZoneDemand {
            zone_id: z.zone_id,
            demand: z.remaining,
        }));
        batch.extend(shipments.iter().map(|s| Mutation::RecordRouteFlow {
            center_id: s.center_id,
            zone_id: s.zone_id,
            amount: s.amount,
        }));

        let report = TransportReport {
            solve: SolveSummary::from(&flow),
            shipments,
            centers,
            zones,
            committed: false,
        };
        Ok((report, batch, routed))
    }

    fn solve(
        &mut self,
        graph: &mut ResidualGraph,
        source: &NodeId,
        sink: &NodeId,
        scenario: &'static str,
    ) -> Result<MaxFlow> {
        let result = self.maxflow.solve(graph, source, sink)?;
        if self.config.is_full_assert() {
            let cut = verify_flow(graph, source, sink, result.value)?;
            tracing::debug!(
                event = "flow_verified",
                scenario,
                cut_capacity = cut.capacity,
                source_side = cut.source_side.len(),
            );
        }
        info!(
            event = "solve_end",
            scenario,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            value = result.value,
            augmenting_paths = result.stats.augmenting_paths,
        );
        Ok(result)
    }

    // Returns whether the batch reached the store.
    fn commit(&mut self, batch: CommitBatch, scenario: &'static str) -> Result<bool> {
        if batch.is_empty() {
            return Ok(false);
        }
        let mutations = batch.len();
        if self.config.dry_run {
            info!(event = "commit", scenario, mutations, dry_run = true);
            return Ok(false);
        }
        self.store
            .commit(batch)
            .map_err(AllocationError::CommitFailure)?;
        info!(event = "commit", scenario, mutations);
        Ok(true)
    }
}

fn consume_batch(cascade: &CascadeOutcome) -> CommitBatch {
    let mut batch = CommitBatch::new();
    for slot in &cascade.slots {
        batch.extend(slot.selection.picks.iter().map(|p| Mutation::ConsumeItem {
            item_id: p.item_id,
            units: p.units,
            slot: Some(slot.slot.name.clone()),
        }));
    }
    batch
}
