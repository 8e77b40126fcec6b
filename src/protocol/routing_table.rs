use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::RouterId;
use crate::protocol::Cost;

/// Selected next hop and total cost towards one destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestRoute {
    pub via: Option<RouterId>,
    pub cost: Cost,
}

impl BestRoute {
    pub fn new(via: &str, cost: Cost) -> Self {
        Self {
            via: Some(via.to_string()),
            cost,
        }
    }

    pub fn to_self(router: &str) -> Self {
        Self::new(router, Cost::ZERO)
    }

    pub fn unreachable() -> Self {
        Self {
            via: None,
            cost: Cost::Infinite,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.via.is_some() && self.cost.is_finite()
    }
}

/// Best routes of one router, keyed by destination. Destinations without an
/// entry are unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    router: RouterId,
    entries: BTreeMap<RouterId, BestRoute>,
}

impl RoutingTable {
    /// A table holding only the (self, 0) entry.
    pub fn new(router: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(router.to_string(), BestRoute::to_self(router));
        Self {
            router: router.to_string(),
            entries,
        }
    }

    pub fn router(&self) -> &RouterId {
        &self.router
    }

    /// Records `route` for `destination`. Unreachable routes are dropped
    /// rather than stored; the self entry is never replaced.
    pub fn set_route(&mut self, destination: &str, route: BestRoute) {
        if destination == self.router {
            return;
        }
        if route.is_reachable() {
            self.entries.insert(destination.to_string(), route);
        } else {
            self.entries.remove(destination);
        }
    }

    pub fn get_route(&self, destination: &str) -> BestRoute {
        self.entries
            .get(destination)
            .cloned()
            .unwrap_or_else(BestRoute::unreachable)
    }

    pub fn cost_to(&self, destination: &str) -> Cost {
        self.entries
            .get(destination)
            .map(|route| route.cost)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouterId, &BestRoute)> {
        self.entries.iter()
    }
}
