pub mod bellman_ford;
pub mod route_selector;

pub use bellman_ford::*;
pub use route_selector::*;
