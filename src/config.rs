use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::RouterId;
use crate::algorithms::{DEFAULT_MAX_ROUNDS, EngineConfig};
use crate::error::{ConfigError, TopologyError};
use crate::network::{IsolationPolicy, LinkEdit, TopologyGraph};
use crate::simulator::CarryOverMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub routers: Vec<RouterId>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
    #[serde(default)]
    pub updates: Vec<UpdateConfig>,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default)]
    pub isolation_policy: IsolationPolicy,
    #[serde(default)]
    pub carry_over: CarryOverMode,
}

/// A link of the initial topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub a: RouterId,
    pub b: RouterId,
    pub cost: u32,
}

/// An edit applied after the first convergence; a cost of -1 removes the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    pub a: RouterId,
    pub b: RouterId,
    pub cost: i64,
}

fn default_max_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            routers: vec![],
            links: vec![],
            updates: vec![],
            max_rounds: DEFAULT_MAX_ROUNDS,
            isolation_policy: IsolationPolicy::default(),
            carry_over: CarryOverMode::default(),
        }
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }

        for router in &self.routers {
            validate_router_name(router)?;
        }

        for link in &self.links {
            validate_router_name(&link.a)?;
            validate_router_name(&link.b)?;
            if link.a == link.b {
                return Err(TopologyError::SelfLoop(link.a.clone()).into());
            }
            if link.cost == 0 {
                return Err(TopologyError::InvalidCost {
                    a: link.a.clone(),
                    b: link.b.clone(),
                    cost: 0,
                }
                .into());
            }
        }

        for update in &self.updates {
            validate_router_name(&update.a)?;
            validate_router_name(&update.b)?;
        }
        self.edits()?;

        Ok(())
    }

    pub fn build_topology(&self) -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        for router in &self.routers {
            graph.add_router(router);
        }
        for link in &self.links {
            graph.add_link(&link.a, &link.b, link.cost);
        }
        graph
    }

    pub fn edits(&self) -> Result<Vec<LinkEdit>, TopologyError> {
        self.updates
            .iter()
            .map(|update| LinkEdit::new(&update.a, &update.b, update.cost))
            .collect()
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_rounds: self.max_rounds,
        }
    }
}

/// Router names are non-empty and purely alphabetic.
pub fn validate_router_name(name: &str) -> Result<(), TopologyError> {
    if name.is_empty() || !name.chars().all(char::is_alphabetic) {
        return Err(TopologyError::InvalidRouterName(name.to_string()));
    }
    Ok(())
}
