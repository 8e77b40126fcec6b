use serde::{Deserialize, Serialize};

use crate::RouterId;
use crate::protocol::Cost;

/// One distance table cell as it stood at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub router: RouterId,
    pub destination: RouterId,
    pub via: RouterId,
    pub cost: Cost,
}

/// Every router's full distance table at the end of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub round: usize,
    pub entries: Vec<SnapshotEntry>,
}

impl RoundSnapshot {
    /// Entries belonging to `router`, in (destination, via) order.
    pub fn for_router<'a>(
        &'a self,
        router: &'a str,
    ) -> impl Iterator<Item = &'a SnapshotEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.router == router)
    }

    /// Looks up one cell. `entries` are kept sorted by (router, destination,
    /// via), so this is a binary search.
    pub fn cost(&self, router: &str, destination: &str, via: &str) -> Cost {
        let key = (router, destination, via);
        self.entries
            .binary_search_by(|entry| {
                (entry.router.as_str(), entry.destination.as_str(), entry.via.as_str()).cmp(&key)
            })
            .map(|position| self.entries[position].cost)
            .unwrap_or_default()
    }
}

/// Receives the per-round trace of a convergence run.
pub trait SnapshotSink {
    fn on_round(&mut self, snapshot: &RoundSnapshot);

    /// When `false` the engine does not build snapshots at all.
    fn wants_snapshots(&self) -> bool {
        true
    }
}

/// Discards snapshots.
impl SnapshotSink for () {
    fn on_round(&mut self, _snapshot: &RoundSnapshot) {}

    fn wants_snapshots(&self) -> bool {
        false
    }
}

/// Keeps the whole history.
impl SnapshotSink for Vec<RoundSnapshot> {
    fn on_round(&mut self, snapshot: &RoundSnapshot) {
        self.push(snapshot.clone());
    }
}

impl<F> SnapshotSink for F
where
    F: FnMut(&RoundSnapshot),
{
    fn on_round(&mut self, snapshot: &RoundSnapshot) {
        self(snapshot)
    }
}
