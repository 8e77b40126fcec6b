use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::RouterId;
use crate::network::RouterIndex;
use crate::protocol::Cost;

/// One router's view of the network: the cost to each destination through
/// each via-neighbor. Missing entries are unreachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceTable {
    entries: BTreeMap<RouterId, BTreeMap<RouterId, Cost>>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Stores `cost` for (`destination`, `via`). Returns `true` when the value
    /// read back for that pair changed.
    pub fn set_cost(&mut self, destination: &str, via: &str, cost: Cost) -> bool {
        let row = self.entries.entry(destination.to_string()).or_default();
        let previous = row.insert(via.to_string(), cost).unwrap_or_default();
        previous != cost
    }

    pub fn get_cost(&self, destination: &str, via: &str) -> Cost {
        self.entries
            .get(destination)
            .and_then(|row| row.get(via))
            .copied()
            .unwrap_or_default()
    }

    /// Drops every entry whose destination or via is not in `index`.
    pub fn retain_routers(&mut self, index: &RouterIndex) {
        self.entries.retain(|destination, _| index.contains(destination));
        for row in self.entries.values_mut() {
            row.retain(|via, _| index.contains(via));
        }
        self.entries.retain(|_, row| !row.is_empty());
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
