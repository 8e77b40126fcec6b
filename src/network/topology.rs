use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::RouterId;
use crate::network::RouterIndex;

/// A symmetric link as stored in the topology, endpoints ordered `a < b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub a: RouterId,
    pub b: RouterId,
    pub cost: u32,
}

/// Routers and the weighted links between them.
///
/// Every adjacency entry is mirrored: if `a` lists `b` with some cost then `b`
/// lists `a` with the same cost. Entries are keyed by neighbor, so a second
/// `add_link` for the same pair replaces the cost instead of adding a parallel
/// edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyGraph {
    routers: BTreeMap<RouterId, BTreeMap<RouterId, u32>>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self {
            routers: BTreeMap::new(),
        }
    }

    pub fn add_router(&mut self, router: &str) {
        if !self.routers.contains_key(router) {
            self.routers.insert(router.to_string(), BTreeMap::new());
        }
    }

    /// Inserts or updates the link between `a` and `b`, creating either router
    /// if needed.
    pub fn add_link(&mut self, a: &str, b: &str, cost: u32) {
        self.add_router(a);
        self.add_router(b);

        if let Some(neighbors) = self.routers.get_mut(a) {
            neighbors.insert(b.to_string(), cost);
        }
        if let Some(neighbors) = self.routers.get_mut(b) {
            neighbors.insert(a.to_string(), cost);
        }
    }

    /// Removes the link between `a` and `b`. Returns the cost it had, or `None`
    /// if there was no such link.
    pub fn remove_link(&mut self, a: &str, b: &str) -> Option<u32> {
        let removed = self
            .routers
            .get_mut(a)
            .and_then(|neighbors| neighbors.remove(b));

        if let Some(neighbors) = self.routers.get_mut(b) {
            neighbors.remove(a);
        }

        removed
    }

    /// Drops a router together with every link touching it.
    pub fn remove_router(&mut self, router: &str) -> bool {
        let Some(neighbors) = self.routers.remove(router) else {
            return false;
        };

        for neighbor in neighbors.keys() {
            if let Some(their_neighbors) = self.routers.get_mut(neighbor) {
                their_neighbors.remove(router);
            }
        }

        true
    }

    pub fn neighbors_of(&self, router: &str) -> Vec<(RouterId, u32)> {
        self.routers
            .get(router)
            .map(|neighbors| {
                neighbors
                    .iter()
                    .map(|(neighbor, cost)| (neighbor.clone(), *cost))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn link_cost(&self, a: &str, b: &str) -> Option<u32> {
        self.routers
            .get(a)
            .and_then(|neighbors| neighbors.get(b))
            .copied()
    }

    pub fn contains_router(&self, router: &str) -> bool {
        self.routers.contains_key(router)
    }

    pub fn is_isolated(&self, router: &str) -> bool {
        self.routers
            .get(router)
            .map(|neighbors| neighbors.is_empty())
            .unwrap_or(false)
    }

    /// All routers in ascending order.
    pub fn routers(&self) -> Vec<RouterId> {
        self.routers.keys().cloned().collect()
    }

    /// Each link once, with `a < b`, sorted.
    pub fn links(&self) -> Vec<Link> {
        self.routers
            .iter()
            .flat_map(|(a, neighbors)| {
                neighbors
                    .iter()
                    .filter(move |(b, _)| a < *b)
                    .map(move |(b, cost)| Link {
                        a: a.clone(),
                        b: b.clone(),
                        cost: *cost,
                    })
            })
            .collect()
    }

    pub fn index(&self) -> RouterIndex {
        RouterIndex::new(self.routers.keys().cloned())
    }

    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    pub fn link_count(&self) -> usize {
        self.routers.values().map(BTreeMap::len).sum::<usize>() / 2
    }
}
