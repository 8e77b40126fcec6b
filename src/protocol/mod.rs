pub mod distance_table;
pub mod routing_table;
pub mod snapshot;
pub mod types;

pub use distance_table::*;
pub use routing_table::*;
pub use snapshot::*;
pub use types::*;
