//! Snapshot Types
//!
//! Serialization structs for per-tick state output.
//!
//! Snapshots are written after every tick (tick 0 is the post-seeding state)
//! and are the only view downstream tooling gets of the agents.

use serde::{Deserialize, Serialize};

use crate::{InfectionRecord, NodeId, StrainIndex};

/// Node sets for one strain at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainSnapshot {
    pub tick: u64,
    pub strain: StrainIndex,
    /// Nodes with `infected` set
    pub infected: Vec<NodeId>,
    /// Nodes exposed but not infected
    pub exposed: Vec<NodeId>,
    /// Nodes neither infected nor exposed
    pub naive: Vec<NodeId>,
}

impl StrainSnapshot {
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Total node count covered by the three sets.
    pub fn population(&self) -> usize {
        self.infected.len() + self.exposed.len() + self.naive.len()
    }
}

/// One strain's record on one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainStateSnapshot {
    pub strain: StrainIndex,
    pub exposed: bool,
    pub infected: bool,
    pub skeptical_level: f64,
}

/// Full state of one agent at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDump {
    pub tick: u64,
    pub node: NodeId,
    pub strains: Vec<StrainStateSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infections: Vec<InfectionRecord>,
}

impl AgentDump {
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Population counts for one strain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrainCounts {
    pub strain: StrainIndex,
    pub infected: usize,
    pub exposed: usize,
    pub naive: usize,
    /// Agents whose skepticism for this strain has reached 1.0
    pub immune: usize,
}

/// Combined states for a pair of opposite strains.
///
/// `first` is the lower strain index. Being infected with both is impossible
/// under cross immunity, so that state has no counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCounts {
    pub first: StrainIndex,
    pub second: StrainIndex,
    /// Exposed to `first`, naive for `second`
    pub exposed_first: usize,
    /// Exposed to `second`, naive for `first`
    pub exposed_second: usize,
    pub exposed_both: usize,
    /// Infected with `first`, naive for `second`
    pub infected_first: usize,
    /// Infected with `second`, naive for `first`
    pub infected_second: usize,
    pub infected_first_exposed_second: usize,
    pub infected_second_exposed_first: usize,
}

/// Population counts across all active strains at one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCounts {
    pub tick: u64,
    pub strains: Vec<StrainCounts>,
    /// One entry per pair of active opposite strains
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<PairCounts>,
    /// Agents naive for every active strain
    pub susceptible: usize,
    /// Agents immune to every active strain
    pub skeptical: usize,
}

impl TickCounts {
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn strain(&self, strain: StrainIndex) -> Option<&StrainCounts> {
        self.strains.iter().find(|c| c.strain == strain)
    }

    /// Combined counts for the pair containing `strain`, if it has an active opposite.
    pub fn pair(&self, strain: StrainIndex) -> Option<&PairCounts> {
        self.pairs
            .iter()
            .find(|p| p.first == strain || p.second == strain)
    }
}
