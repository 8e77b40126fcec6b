use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::RouterId;
use crate::algorithms::ConvergenceState;
use crate::error::{Result, TopologyError};
use crate::network::{RouterIndex, TopologyGraph};
use crate::protocol::RoutingTable;

/// Cost value that turns an edit command into a link removal.
pub const REMOVE_LINK: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditCost {
    Remove,
    Weight(u32),
}

/// A single topology edit: set the link between `a` and `b` to a weight, or
/// remove it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEdit {
    pub a: RouterId,
    pub b: RouterId,
    pub cost: EditCost,
}

impl LinkEdit {
    /// Parses a raw edit cost: `REMOVE_LINK` removes, positive values set a
    /// weight, anything else is rejected. Self-loops are rejected too.
    pub fn new(a: &str, b: &str, cost: i64) -> Result<Self> {
        if a == b {
            return Err(TopologyError::SelfLoop(a.to_string()));
        }

        let cost = match cost {
            REMOVE_LINK => EditCost::Remove,
            c if c > 0 => match u32::try_from(c) {
                Ok(weight) => EditCost::Weight(weight),
                Err(_) => {
                    return Err(TopologyError::InvalidCost {
                        a: a.to_string(),
                        b: b.to_string(),
                        cost,
                    });
                }
            },
            _ => {
                return Err(TopologyError::InvalidCost {
                    a: a.to_string(),
                    b: b.to_string(),
                    cost,
                });
            }
        };

        Ok(Self {
            a: a.to_string(),
            b: b.to_string(),
            cost,
        })
    }

    pub fn weight(a: &str, b: &str, cost: u32) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
            cost: EditCost::Weight(cost),
        }
    }

    pub fn remove(a: &str, b: &str) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
            cost: EditCost::Remove,
        }
    }
}

/// What happens to a router whose last link is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationPolicy {
    #[default]
    Keep,
    RemoveIsolated,
}

/// Tally of a batch of edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub added: usize,
    pub reweighted: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub cost_increased: bool,
    pub created_routers: Vec<RouterId>,
    pub dropped_routers: Vec<RouterId>,
}

impl UpdateSummary {
    /// No link vanished, got dearer, or lost a router. Carried-over routes are
    /// then still achievable in the new topology.
    pub fn only_improvements(&self) -> bool {
        self.removed == 0 && !self.cost_increased && self.dropped_routers.is_empty()
    }

    pub fn applied(&self) -> usize {
        self.added + self.reweighted + self.removed
    }

    pub fn merge(&mut self, other: UpdateSummary) {
        self.added += other.added;
        self.reweighted += other.reweighted;
        self.removed += other.removed;
        self.unchanged += other.unchanged;
        self.cost_increased |= other.cost_increased;
        self.created_routers.extend(other.created_routers);
        self.dropped_routers.extend(other.dropped_routers);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TopologyUpdater {
    policy: IsolationPolicy,
}

impl TopologyUpdater {
    pub fn new(policy: IsolationPolicy) -> Self {
        Self { policy }
    }

    pub fn apply_edit(&self, graph: &mut TopologyGraph, edit: &LinkEdit) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        self.apply_into(graph, edit, &mut summary);
        summary
    }

    /// Applies `edits` in order.
    pub fn apply_batch<'a, I>(&self, graph: &mut TopologyGraph, edits: I) -> UpdateSummary
    where
        I: IntoIterator<Item = &'a LinkEdit>,
    {
        let mut summary = UpdateSummary::default();
        for edit in edits {
            self.apply_into(graph, edit, &mut summary);
        }

        info!(
            "Applied {} edits: {} added, {} reweighted, {} removed, {} routers dropped",
            summary.applied(),
            summary.added,
            summary.reweighted,
            summary.removed,
            summary.dropped_routers.len()
        );
        summary
    }

    fn apply_into(&self, graph: &mut TopologyGraph, edit: &LinkEdit, summary: &mut UpdateSummary) {
        // Removals never create routers.
        if let EditCost::Weight(_) = edit.cost {
            for router in [&edit.a, &edit.b] {
                if !graph.contains_router(router) {
                    graph.add_router(router);
                    summary.created_routers.push(router.clone());
                }
            }
        }

        // A reweight is a removal followed by a fresh insert.
        let previous = graph.remove_link(&edit.a, &edit.b);

        match (edit.cost, previous) {
            (EditCost::Remove, Some(old)) => {
                debug!("Removed link {}-{} (cost {})", edit.a, edit.b, old);
                summary.removed += 1;
                self.drop_if_isolated(graph, &edit.a, summary);
                self.drop_if_isolated(graph, &edit.b, summary);
            }
            (EditCost::Remove, None) => {
                debug!("No link {}-{} to remove", edit.a, edit.b);
                summary.unchanged += 1;
            }
            (EditCost::Weight(cost), None) => {
                debug!("Added link {}-{} cost {}", edit.a, edit.b, cost);
                graph.add_link(&edit.a, &edit.b, cost);
                summary.added += 1;
            }
            (EditCost::Weight(cost), Some(old)) => {
                graph.add_link(&edit.a, &edit.b, cost);
                if cost == old {
                    summary.unchanged += 1;
                } else {
                    debug!("Reweighted link {}-{} from {} to {}", edit.a, edit.b, old, cost);
                    summary.reweighted += 1;
                    summary.cost_increased |= cost > old;
                }
            }
        }
    }

    fn drop_if_isolated(
        &self,
        graph: &mut TopologyGraph,
        router: &str,
        summary: &mut UpdateSummary,
    ) {
        if self.policy == IsolationPolicy::RemoveIsolated && graph.is_isolated(router) {
            debug!("Router {} has no links left, dropping it", router);
            graph.remove_router(router);
            summary.dropped_routers.push(router.to_string());
        }
    }
}

/// Rebuilds `old` for the router set in `new_index`.
///
/// Routers present in both sets keep their distance entries and best routes
/// for destinations (and vias) that also survive. New routers start empty.
/// Every self route is reset to (self, 0).
pub fn carry_over_state(old: &ConvergenceState, new_index: &RouterIndex) -> ConvergenceState {
    let mut state = ConvergenceState::cold(new_index.clone());
    let mut carried = 0;

    for router in new_index.iter().filter(|r| old.index.contains(r)) {
        if let Some(table) = old.distance_tables.get(router) {
            let mut table = table.clone();
            table.retain_routers(new_index);
            state.distance_tables.insert(router.clone(), table);
        }

        if let Some(old_routes) = old.routing_tables.get(router) {
            let mut routes = RoutingTable::new(router);
            for (destination, route) in old_routes.iter() {
                let via_survives = route.via.as_deref().is_some_and(|via| new_index.contains(via));
                if new_index.contains(destination) && via_survives {
                    routes.set_route(destination, route.clone());
                }
            }
            state.routing_tables.insert(router.clone(), routes);
        }

        carried += 1;
    }

    debug!(
        "Carried over state for {} of {} routers",
        carried,
        new_index.len()
    );
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BestRoute, Cost};

    fn line() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_link("X", "Y", 1);
        graph.add_link("Y", "Z", 3);
        graph
    }

    #[test]
    fn link_edit_parses_sentinel_and_rejects_bad_costs() {
        assert_eq!(LinkEdit::new("X", "Y", -1).unwrap(), LinkEdit::remove("X", "Y"));
        assert_eq!(LinkEdit::new("X", "Y", 4).unwrap(), LinkEdit::weight("X", "Y", 4));
        assert!(matches!(
            LinkEdit::new("X", "Y", 0),
            Err(TopologyError::InvalidCost { cost: 0, .. })
        ));
        assert!(LinkEdit::new("X", "Y", -7).is_err());
        assert!(LinkEdit::new("X", "Y", i64::from(u32::MAX) + 1).is_err());
        assert!(matches!(LinkEdit::new("X", "X", 2), Err(TopologyError::SelfLoop(_))));
    }

    #[test]
    fn reweight_keeps_links_symmetric() {
        let mut graph = line();
        let summary =
            TopologyUpdater::default().apply_edit(&mut graph, &LinkEdit::weight("Y", "X", 6));

        assert_eq!(summary.reweighted, 1);
        assert!(summary.cost_increased);
        assert!(!summary.only_improvements());
        assert_eq!(graph.link_cost("X", "Y"), Some(6));
        assert_eq!(graph.link_cost("Y", "X"), Some(6));
        assert_eq!(graph.link_count(), 2);
    }

    #[test]
    fn same_weight_counts_as_unchanged() {
        let mut graph = line();
        let summary =
            TopologyUpdater::default().apply_edit(&mut graph, &LinkEdit::weight("X", "Y", 1));

        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.applied(), 0);
        assert!(summary.only_improvements());
    }

    #[test]
    fn unknown_routers_are_created() {
        let mut graph = line();
        let summary =
            TopologyUpdater::default().apply_edit(&mut graph, &LinkEdit::weight("W", "X", 2));

        assert_eq!(summary.created_routers, vec!["W".to_string()]);
        assert_eq!(summary.added, 1);
        assert_eq!(graph.neighbors_of("W"), vec![("X".to_string(), 2)]);
    }

    #[test]
    fn removing_missing_link_is_a_noop() {
        let mut graph = line();
        let before = graph.clone();
        let summary =
            TopologyUpdater::default().apply_edit(&mut graph, &LinkEdit::remove("X", "Z"));

        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.removed, 0);
        assert_eq!(graph, before);
    }

    #[test]
    fn removing_link_between_unknown_routers_leaves_graph_alone() {
        for policy in [IsolationPolicy::Keep, IsolationPolicy::RemoveIsolated] {
            let mut graph = line();
            let before = graph.clone();
            let summary =
                TopologyUpdater::new(policy).apply_edit(&mut graph, &LinkEdit::remove("Q", "R"));

            assert_eq!(summary.unchanged, 1);
            assert!(summary.created_routers.is_empty());
            assert!(summary.dropped_routers.is_empty());
            assert_eq!(graph.routers(), before.routers());
            assert_eq!(graph, before);
        }
    }

    #[test]
    fn isolation_policy_controls_router_removal() {
        let edit = LinkEdit::remove("X", "Y");

        let mut kept = line();
        let summary = TopologyUpdater::new(IsolationPolicy::Keep).apply_edit(&mut kept, &edit);
        assert!(summary.dropped_routers.is_empty());
        assert!(kept.contains_router("X"));

        let mut pruned = line();
        let summary =
            TopologyUpdater::new(IsolationPolicy::RemoveIsolated).apply_edit(&mut pruned, &edit);
        assert_eq!(summary.dropped_routers, vec!["X".to_string()]);
        assert_eq!(pruned.routers(), vec!["Y".to_string(), "Z".to_string()]);
    }

    #[test]
    fn batch_applies_in_order() {
        let mut graph = line();
        let edits = [
            LinkEdit::weight("X", "Z", 1),
            LinkEdit::weight("X", "Z", 2),
            LinkEdit::remove("Y", "Z"),
        ];

        let summary = TopologyUpdater::default().apply_batch(&mut graph, &edits);

        assert_eq!(summary.added, 1);
        assert_eq!(summary.reweighted, 1);
        assert_eq!(summary.removed, 1);
        assert_eq!(graph.link_cost("Z", "X"), Some(2));
        assert_eq!(graph.link_cost("Y", "Z"), None);
    }

    #[test]
    fn carry_over_keeps_shared_routers_only() {
        let mut old = ConvergenceState::cold(line().index());
        old.routing_tables
            .get_mut("X")
            .unwrap()
            .set_route("Z", BestRoute::new("Y", Cost::Finite(4)));
        old.routing_tables
            .get_mut("Y")
            .unwrap()
            .set_route("X", BestRoute::new("X", Cost::Finite(1)));
        old.distance_tables
            .get_mut("X")
            .unwrap()
            .set_cost("Z", "Y", Cost::Finite(4));

        let new_index = RouterIndex::new(["W", "X", "Z"].map(String::from));
        let state = carry_over_state(&old, &new_index);

        assert_eq!(state.index, new_index);
        assert!(!state.routing_tables.contains_key("Y"));
        // X's route to Z went through Y, which is gone.
        assert_eq!(state.best_route("X", "Z"), BestRoute::unreachable());
        assert_eq!(state.distance_tables["X"].get_cost("Z", "Y"), Cost::Infinite);
        assert_eq!(state.best_route("W", "W"), BestRoute::to_self("W"));
        assert!(state.distance_tables["W"].is_empty());
    }

    #[test]
    fn carry_over_with_same_routers_keeps_routes() {
        let index = line().index();
        let mut old = ConvergenceState::cold(index.clone());
        old.routing_tables
            .get_mut("Z")
            .unwrap()
            .set_route("X", BestRoute::new("Y", Cost::Finite(4)));

        let state = carry_over_state(&old, &index);

        assert_eq!(state, old);
    }
}
