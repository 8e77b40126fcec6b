use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// A path cost. `Infinite` marks an unreachable destination and absorbs
/// under addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cost {
    Finite(u32),
    #[default]
    Infinite,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0);

    pub fn is_finite(&self) -> bool {
        matches!(self, Cost::Finite(_))
    }
}

impl From<Option<u32>> for Cost {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Cost::Infinite, Cost::Finite)
    }
}

impl Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => a.checked_add(b).into(),
            _ => Cost::Infinite,
        }
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cost::Finite(a), Cost::Finite(b)) => a.cmp(b),
            (Cost::Finite(_), Cost::Infinite) => Ordering::Less,
            (Cost::Infinite, Cost::Finite(_)) => Ordering::Greater,
            (Cost::Infinite, Cost::Infinite) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(value) => write!(f, "{}", value),
            Cost::Infinite => write!(f, "INF"),
        }
    }
}
