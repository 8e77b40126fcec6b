use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::RouterId;
use crate::algorithms::select_route;
use crate::network::{RouterIndex, TopologyGraph, updater};
use crate::protocol::{
    BestRoute, Cost, DistanceTable, RoundSnapshot, RoutingTable, SnapshotEntry, SnapshotSink,
};

pub const DEFAULT_MAX_ROUNDS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Distance tables and routing tables of every router in `index`.
///
/// This is what a run returns and what a later run may be seeded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceState {
    pub index: RouterIndex,
    pub distance_tables: BTreeMap<RouterId, DistanceTable>,
    pub routing_tables: BTreeMap<RouterId, RoutingTable>,
}

impl ConvergenceState {
    /// Empty distance tables; every router only knows the route to itself.
    pub fn cold(index: RouterIndex) -> Self {
        let distance_tables = index
            .iter()
            .map(|router| (router.clone(), DistanceTable::new()))
            .collect();
        let routing_tables = index
            .iter()
            .map(|router| (router.clone(), RoutingTable::new(router)))
            .collect();

        Self {
            index,
            distance_tables,
            routing_tables,
        }
    }

    pub fn routing_table(&self, router: &str) -> Option<&RoutingTable> {
        self.routing_tables.get(router)
    }

    pub fn best_route(&self, router: &str, destination: &str) -> BestRoute {
        match self.routing_tables.get(router) {
            Some(table) => table.get_route(destination),
            None => BestRoute::unreachable(),
        }
    }

    /// Best known cost from `router` to `destination`; zero on the diagonal.
    pub fn best_cost(&self, router: &str, destination: &str) -> Cost {
        if router == destination {
            return Cost::ZERO;
        }
        self.routing_tables
            .get(router)
            .map(|table| table.cost_to(destination))
            .unwrap_or_default()
    }

    /// Full (router, destination, via) cost grid, skipping the source row and
    /// column of each router. Entries come out sorted by that triple.
    pub fn snapshot(&self, round: usize) -> RoundSnapshot {
        let mut entries = Vec::new();

        for router in self.index.iter() {
            let table = self.distance_tables.get(router);
            for destination in self.index.iter().filter(|d| *d != router) {
                for via in self.index.iter().filter(|v| *v != router) {
                    entries.push(SnapshotEntry {
                        router: router.clone(),
                        destination: destination.clone(),
                        via: via.clone(),
                        cost: table
                            .map(|t| t.get_cost(destination, via))
                            .unwrap_or_default(),
                    });
                }
            }
        }

        RoundSnapshot { round, entries }
    }
}

/// What changed during a single relaxation round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundDelta {
    pub changed_entries: usize,
    pub changed_routes: usize,
}

impl RoundDelta {
    pub fn is_fixed_point(&self) -> bool {
        self.changed_entries == 0 && self.changed_routes == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvergenceOutcome {
    pub state: ConvergenceState,
    pub converged: bool,
    pub rounds: usize,
}

/// Synchronous, global Bellman-Ford relaxation over a topology.
#[derive(Debug, Clone, Default)]
pub struct ConvergenceEngine {
    config: EngineConfig,
}

impl ConvergenceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn with_max_rounds(max_rounds: usize) -> Self {
        Self::new(EngineConfig { max_rounds })
    }

    /// Relaxes until no entry and no best route changes, or until the round
    /// cap is hit. `sink` sees a snapshot after every round, numbered from 0.
    ///
    /// A `seed` built for a different router set is carried over to the
    /// current one first.
    pub fn converge<S>(
        &self,
        graph: &TopologyGraph,
        seed: Option<ConvergenceState>,
        sink: &mut S,
    ) -> ConvergenceOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        let index = graph.index();
        let mut state = match seed {
            Some(seed) => {
                if seed.index != index {
                    debug!(
                        "Seed covers {} routers, topology has {}",
                        seed.index.len(),
                        index.len()
                    );
                }
                updater::carry_over_state(&seed, &index)
            }
            None => ConvergenceState::cold(index),
        };

        let mut round = 0;
        while round < self.config.max_rounds {
            let delta = self.relax_round(graph, &mut state);
            if sink.wants_snapshots() {
                sink.on_round(&state.snapshot(round));
            }
            round += 1;

            debug!(
                "Round {}: {} entries changed, {} routes changed",
                round - 1,
                delta.changed_entries,
                delta.changed_routes
            );

            if delta.is_fixed_point() {
                info!(
                    "Converged after {} rounds over {} routers",
                    round,
                    state.index.len()
                );
                return ConvergenceOutcome {
                    state,
                    converged: true,
                    rounds: round,
                };
            }
        }

        warn!(
            "No convergence after {} rounds, returning last tables",
            self.config.max_rounds
        );
        ConvergenceOutcome {
            state,
            converged: false,
            rounds: round,
        }
    }

    /// Runs one round against the best routes currently held in `state` and
    /// replaces them with the newly selected ones.
    pub fn relax_round(&self, graph: &TopologyGraph, state: &mut ConvergenceState) -> RoundDelta {
        let routers: Vec<RouterId> = state.index.routers().to_vec();
        let baseline = state.routing_tables.clone();
        let best_known = |via: &str, destination: &str| -> Cost {
            if via == destination {
                return Cost::ZERO;
            }
            baseline
                .get(via)
                .map(|table| table.cost_to(destination))
                .unwrap_or_default()
        };

        let mut delta = RoundDelta::default();
        let mut next_routes = BTreeMap::new();

        for router in &routers {
            let table = state.distance_tables.entry(router.clone()).or_default();
            let mut routing = RoutingTable::new(router);
            let previous = baseline.get(router);

            for destination in routers.iter().filter(|d| *d != router) {
                for via in routers.iter().filter(|v| *v != router) {
                    let candidate = match graph.link_cost(router, via) {
                        Some(link) => Cost::Finite(link) + best_known(via, destination),
                        None => Cost::Infinite,
                    };
                    if table.set_cost(destination, via, candidate) {
                        delta.changed_entries += 1;
                    }
                }

                let vias = routers.iter().filter(|v| *v != router);
                let route = select_route(table, destination, vias);
                let before = previous
                    .map(|t| t.get_route(destination))
                    .unwrap_or_else(BestRoute::unreachable);
                if route != before {
                    delta.changed_routes += 1;
                }
                routing.set_route(destination, route);
            }

            next_routes.insert(router.clone(), routing);
        }

        state.routing_tables = next_routes;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_link("X", "Y", 1);
        graph.add_link("Y", "Z", 3);
        graph
    }

    #[test]
    fn line_converges_in_four_rounds() {
        let graph = line();
        let mut history: Vec<RoundSnapshot> = Vec::new();

        let outcome = ConvergenceEngine::default().converge(&graph, None, &mut history);

        assert!(outcome.converged);
        assert_eq!(outcome.rounds, 4);
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].round, 0);
        assert_eq!(history[0].cost("X", "Z", "Y"), Cost::Infinite);
        assert_eq!(history[1].cost("X", "Z", "Y"), Cost::Finite(4));
        // Routes settle in round 1, the loopback entries one round later.
        assert_eq!(history[1].cost("Y", "X", "Z"), Cost::Infinite);
        assert_eq!(history[2].cost("Y", "X", "Z"), Cost::Finite(7));
        assert_eq!(history[3], RoundSnapshot { round: 3, ..history[2].clone() });
    }

    #[test]
    fn snapshot_skips_own_row_and_column() {
        let graph = line();
        let state = ConvergenceEngine::default().converge(&graph, None, &mut ()).state;

        let snapshot = state.snapshot(7);
        assert_eq!(snapshot.round, 7);
        // 3 routers, 2 destinations x 2 vias each.
        assert_eq!(snapshot.entries.len(), 12);
        assert!(snapshot.entries.iter().all(|e| e.router != e.via && e.router != e.destination));
        assert_eq!(snapshot.for_router("Y").count(), 4);
    }

    #[test]
    fn round_with_unchanged_baseline_is_a_fixed_point() {
        let graph = line();
        let engine = ConvergenceEngine::default();
        let mut state = engine.converge(&graph, None, &mut ()).state;
        let before = state.clone();

        let delta = engine.relax_round(&graph, &mut state);

        assert!(delta.is_fixed_point());
        assert_eq!(state, before);
    }

    #[test]
    fn cap_stops_the_run() {
        let graph = line();
        let outcome = ConvergenceEngine::with_max_rounds(2).converge(&graph, None, &mut ());

        assert!(!outcome.converged);
        assert_eq!(outcome.rounds, 2);
        assert_eq!(outcome.state.best_route("X", "Z"), BestRoute::new("Y", Cost::Finite(4)));
    }

    #[test]
    fn closure_sink_sees_every_round() {
        let graph = line();
        let mut rounds = Vec::new();
        let mut sink = |snapshot: &RoundSnapshot| rounds.push(snapshot.round);

        let outcome = ConvergenceEngine::default().converge(&graph, None, &mut sink);

        assert_eq!(rounds, (0..outcome.rounds).collect::<Vec<_>>());
    }

    struct Silent {
        calls: usize,
    }

    impl SnapshotSink for Silent {
        fn on_round(&mut self, _snapshot: &RoundSnapshot) {
            self.calls += 1;
        }

        fn wants_snapshots(&self) -> bool {
            false
        }
    }

    #[test]
    fn sinks_that_opt_out_get_no_snapshots() {
        let mut sink = Silent { calls: 0 };

        let outcome = ConvergenceEngine::default().converge(&line(), None, &mut sink);

        assert!(outcome.converged);
        assert_eq!(outcome.rounds, 4);
        assert_eq!(sink.calls, 0);
    }

    #[test]
    fn empty_and_single_router_topologies_converge_immediately() {
        let engine = ConvergenceEngine::default();

        let outcome = engine.converge(&TopologyGraph::new(), None, &mut ());
        assert!(outcome.converged);
        assert_eq!(outcome.rounds, 1);

        let mut graph = TopologyGraph::new();
        graph.add_router("X");
        let outcome = engine.converge(&graph, None, &mut ());
        assert!(outcome.converged);
        assert_eq!(outcome.state.best_route("X", "X"), BestRoute::to_self("X"));
    }
}
