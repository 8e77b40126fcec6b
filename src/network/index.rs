use serde::{Deserialize, Serialize};

use crate::RouterId;

/// Sorted, dense positions for a router set.
///
/// Rebuilt whenever the set of routers changes. Positions are only meaningful
/// for the set the index was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterIndex {
    routers: Vec<RouterId>,
}

impl RouterIndex {
    pub fn new<I>(routers: I) -> Self
    where
        I: IntoIterator<Item = RouterId>,
    {
        let mut routers: Vec<RouterId> = routers.into_iter().collect();
        routers.sort();
        routers.dedup();
        Self { routers }
    }

    pub fn position(&self, router: &str) -> Option<usize> {
        self.routers
            .binary_search_by(|probe| probe.as_str().cmp(router))
            .ok()
    }

    pub fn contains(&self, router: &str) -> bool {
        self.position(router).is_some()
    }

    pub fn routers(&self) -> &[RouterId] {
        &self.routers
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouterId> {
        self.routers.iter()
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}
