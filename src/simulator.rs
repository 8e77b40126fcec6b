use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithms::{ConvergenceEngine, ConvergenceOutcome, ConvergenceState};
use crate::config::SimulationConfig;
use crate::network::{LinkEdit, TopologyGraph, TopologyUpdater, UpdateSummary};
use crate::protocol::{BestRoute, RoutingTable, SnapshotSink};

/// Whether a re-run starts from the previous converged state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverMode {
    Always,
    /// Carry over only when the pending edits removed nothing and raised no
    /// cost; stale routes could otherwise count to infinity.
    #[default]
    WhenSafe,
    Never,
}

/// One topology, its edits, and the state of its last convergence run.
#[derive(Debug)]
pub struct Simulator {
    graph: TopologyGraph,
    engine: ConvergenceEngine,
    updater: TopologyUpdater,
    carry_over: CarryOverMode,
    last: Option<ConvergenceOutcome>,
    pending: Option<UpdateSummary>,
}

impl Simulator {
    pub fn new(
        graph: TopologyGraph,
        engine: ConvergenceEngine,
        updater: TopologyUpdater,
        carry_over: CarryOverMode,
    ) -> Self {
        Self {
            graph,
            engine,
            updater,
            carry_over,
            last: None,
            pending: None,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.build_topology(),
            ConvergenceEngine::new(config.engine_config()),
            TopologyUpdater::new(config.isolation_policy),
            config.carry_over,
        )
    }

    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    pub fn state(&self) -> Option<&ConvergenceState> {
        self.last.as_ref().map(|outcome| &outcome.state)
    }

    /// Converges the current topology from scratch.
    pub fn converge<S>(&mut self, sink: &mut S) -> &ConvergenceOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        self.run(None, sink)
    }

    /// Applies a batch of edits. They take effect in the next `reconverge`.
    pub fn apply_edits(&mut self, edits: &[LinkEdit]) -> UpdateSummary {
        let summary = self.updater.apply_batch(&mut self.graph, edits);
        self.pending
            .get_or_insert_with(UpdateSummary::default)
            .merge(summary.clone());
        summary
    }

    /// Whether the next `reconverge` will be seeded with the last state.
    pub fn will_carry_over(&self) -> bool {
        if self.last.is_none() {
            return false;
        }
        match self.carry_over {
            CarryOverMode::Always => true,
            CarryOverMode::Never => false,
            CarryOverMode::WhenSafe => self
                .pending
                .as_ref()
                .is_none_or(UpdateSummary::only_improvements),
        }
    }

    /// Converges again after edits, seeded according to the carry-over mode.
    pub fn reconverge<S>(&mut self, sink: &mut S) -> &ConvergenceOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        let seed = if self.will_carry_over() {
            debug!("Reconverging from carried-over state");
            self.state().cloned()
        } else {
            debug!("Reconverging from a cold start");
            None
        };
        self.run(seed, sink)
    }

    pub fn routing_table(&self, router: &str) -> Option<&RoutingTable> {
        self.state().and_then(|state| state.routing_table(router))
    }

    pub fn best_route(&self, router: &str, destination: &str) -> BestRoute {
        self.state()
            .map(|state| state.best_route(router, destination))
            .unwrap_or_else(BestRoute::unreachable)
    }

    fn run<S>(&mut self, seed: Option<ConvergenceState>, sink: &mut S) -> &ConvergenceOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        let outcome = self.engine.converge(&self.graph, seed, sink);
        info!(
            "Run finished after {} rounds ({} routers, {} links, converged: {})",
            outcome.rounds,
            self.graph.router_count(),
            self.graph.link_count(),
            outcome.converged
        );
        self.pending = None;
        self.last.insert(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::IsolationPolicy;
    use crate::protocol::Cost;

    fn line_simulator(mode: CarryOverMode) -> Simulator {
        let mut graph = TopologyGraph::new();
        graph.add_link("X", "Y", 1);
        graph.add_link("Y", "Z", 3);
        Simulator::new(
            graph,
            ConvergenceEngine::default(),
            TopologyUpdater::new(IsolationPolicy::Keep),
            mode,
        )
    }

    #[test]
    fn nothing_to_carry_before_first_run() {
        let sim = line_simulator(CarryOverMode::Always);
        assert!(!sim.will_carry_over());
        assert_eq!(sim.best_route("X", "Y"), BestRoute::unreachable());
    }

    #[test]
    fn when_safe_depends_on_pending_edits() {
        let mut sim = line_simulator(CarryOverMode::WhenSafe);
        sim.converge(&mut ());
        assert!(sim.will_carry_over());

        sim.apply_edits(&[LinkEdit::weight("X", "Z", 1)]);
        assert!(sim.will_carry_over());

        sim.apply_edits(&[LinkEdit::remove("X", "Y")]);
        assert!(!sim.will_carry_over());

        sim.reconverge(&mut ());
        assert!(sim.will_carry_over());
    }

    #[test]
    fn never_and_always_ignore_edits() {
        let mut never = line_simulator(CarryOverMode::Never);
        never.converge(&mut ());
        assert!(!never.will_carry_over());

        let mut always = line_simulator(CarryOverMode::Always);
        always.converge(&mut ());
        always.apply_edits(&[LinkEdit::weight("Y", "Z", 9)]);
        assert!(always.will_carry_over());
    }

    #[test]
    fn warm_start_needs_fewer_rounds_for_a_new_shortcut() {
        let mut cold = line_simulator(CarryOverMode::Never);
        cold.converge(&mut ());
        cold.apply_edits(&[LinkEdit::weight("X", "Z", 1)]);
        let cold_rounds = cold.reconverge(&mut ()).rounds;

        let mut warm = line_simulator(CarryOverMode::WhenSafe);
        warm.converge(&mut ());
        warm.apply_edits(&[LinkEdit::weight("X", "Z", 1)]);
        let warm = warm.reconverge(&mut ());

        assert!(warm.converged);
        assert!(warm.rounds <= cold_rounds);
        assert_eq!(warm.state.best_route("X", "Z"), BestRoute::new("Z", Cost::Finite(1)));
        assert_eq!(cold.best_route("X", "Z"), BestRoute::new("Z", Cost::Finite(1)));
    }
}
