pub mod index;
pub mod topology;
pub mod updater;

pub use index::*;
pub use topology::*;
pub use updater::{
    EditCost, IsolationPolicy, LinkEdit, REMOVE_LINK, TopologyUpdater, UpdateSummary,
    carry_over_state,
};
