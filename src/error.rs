use thiserror::Error;

use crate::RouterId;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Link {0}-{0} is a self-loop")]
    SelfLoop(RouterId),

    #[error("Invalid cost {cost} for link {a}-{b}")]
    InvalidCost { a: RouterId, b: RouterId, cost: i64 },

    #[error("Invalid router name '{0}'")]
    InvalidRouterName(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("max_rounds must be at least 1")]
    ZeroRounds,
}

pub type Result<T> = std::result::Result<T, TopologyError>;
