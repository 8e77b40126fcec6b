pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;
pub mod report;
pub mod simulator;

pub use algorithms::{ConvergenceEngine, ConvergenceOutcome, ConvergenceState, EngineConfig};
pub use config::SimulationConfig;
pub use network::{IsolationPolicy, LinkEdit, TopologyGraph, TopologyUpdater};
pub use protocol::{BestRoute, Cost, DistanceTable, RoundSnapshot, SnapshotSink};
pub use simulator::{CarryOverMode, Simulator};

pub type RouterId = String;
