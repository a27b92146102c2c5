//! Agent Components
//!
//! Per-node belief state for every strain, and the provenance log of infections
//! an agent has received.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use strain_events::{InfectionRecord, NodeId, StrainIndex, StrainStateSnapshot, MAX_STRAINS};

/// Skepticism forced onto the opposite strain by seeding or infection.
pub const CROSS_IMMUNITY_LEVEL: f64 = 0.90;

/// Increment applied by a successful skepticism-gain draw.
pub const SKEPTICISM_STEP: f64 = 0.10;

/// At or above this level a gain snaps straight to [`IMMUNE_LEVEL`].
pub const SATURATION_THRESHOLD: f64 = 0.91;

/// Skepticism that denotes permanent immunity.
pub const IMMUNE_LEVEL: f64 = 1.0;

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// The contact-graph node an agent is placed on
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Node(pub NodeId);

/// One strain's status on one agent.
///
/// `exposed` and `infected` are independent; an agent is naive when neither is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainRecord {
    pub exposed: bool,
    pub infected: bool,
    /// 0.0 to 1.0; 1.0 is permanent immunity
    pub skeptical_level: f64,
}

impl Default for StrainRecord {
    fn default() -> Self {
        Self::naive(0.0)
    }
}

impl StrainRecord {
    pub fn naive(skeptical_level: f64) -> Self {
        Self {
            exposed: false,
            infected: false,
            skeptical_level: skeptical_level.clamp(0.0, IMMUNE_LEVEL),
        }
    }

    pub fn is_naive(&self) -> bool {
        !self.exposed && !self.infected
    }

    /// Exposed but not (yet) infected
    pub fn is_exposed_only(&self) -> bool {
        self.exposed && !self.infected
    }

    pub fn is_immune(&self) -> bool {
        self.skeptical_level >= IMMUNE_LEVEL
    }

    /// Apply one skepticism-gain event and return the new level.
    ///
    /// Below the saturation threshold the level rises by one step; at or above it the
    /// level snaps to immunity. The result never exceeds [`IMMUNE_LEVEL`].
    pub fn gain_skepticism(&mut self) -> f64 {
        self.skeptical_level = if self.skeptical_level < SATURATION_THRESHOLD {
            (self.skeptical_level + SKEPTICISM_STEP).min(IMMUNE_LEVEL)
        } else {
            IMMUNE_LEVEL
        };
        self.skeptical_level
    }
}

/// Belief state for every configured strain.
///
/// Dormant strains keep their records so a three-strain layout can run one or two strains.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentState {
    strains: [StrainRecord; MAX_STRAINS],
}

impl AgentState {
    /// Naive agent with the given starting skepticism per strain
    pub fn new(skeptical_levels: [f64; MAX_STRAINS]) -> Self {
        Self {
            strains: skeptical_levels.map(StrainRecord::naive),
        }
    }

    pub fn strain(&self, strain: StrainIndex) -> &StrainRecord {
        &self.strains[strain.index()]
    }

    pub fn strain_mut(&mut self, strain: StrainIndex) -> &mut StrainRecord {
        &mut self.strains[strain.index()]
    }

    pub fn set_skeptical_level(&mut self, strain: StrainIndex, level: f64) {
        self.strains[strain.index()].skeptical_level = level.clamp(0.0, IMMUNE_LEVEL);
    }

    /// Mark the agent as an initial outbreak node for `strain`.
    ///
    /// The paired strain, if any, is forced to the cross-immunity level and cleared.
    pub fn seed(&mut self, strain: StrainIndex, opposite: Option<StrainIndex>) {
        let record = self.strain_mut(strain);
        record.infected = true;
        record.exposed = true;

        if let Some(opposite) = opposite {
            let paired = self.strain_mut(opposite);
            paired.skeptical_level = CROSS_IMMUNITY_LEVEL;
            paired.infected = false;
        }
    }

    /// Expose a naive agent. Returns false when the agent was not naive.
    pub fn receive_exposure(&mut self, strain: StrainIndex) -> bool {
        let record = self.strain_mut(strain);
        if !record.is_naive() {
            return false;
        }
        record.exposed = true;
        true
    }

    /// Infect an exposed agent, clearing exposure and excluding the paired strain.
    ///
    /// Returns false when the agent was not in the exposed-only state.
    pub fn receive_infection(&mut self, strain: StrainIndex, opposite: Option<StrainIndex>) -> bool {
        let record = self.strain_mut(strain);
        if !record.is_exposed_only() {
            return false;
        }
        record.infected = true;
        record.exposed = false;

        if let Some(opposite) = opposite {
            let paired = self.strain_mut(opposite);
            paired.skeptical_level = paired.skeptical_level.max(CROSS_IMMUNITY_LEVEL);
            paired.infected = false;
        }
        true
    }

    /// Snapshot records for the first `active` strains.
    pub fn snapshot(&self, active: usize) -> Vec<StrainStateSnapshot> {
        StrainIndex::range(active)
            .map(|strain| {
                let record = self.strain(strain);
                StrainStateSnapshot {
                    strain,
                    exposed: record.exposed,
                    infected: record.infected,
                    skeptical_level: record.skeptical_level,
                }
            })
            .collect()
    }
}

/// Infections received by an agent, in the order they happened.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct InfectionLog {
    records: Vec<InfectionRecord>,
}

impl InfectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: InfectionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[InfectionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any recorded infection was for `strain`
    pub fn has_strain(&self, strain: StrainIndex) -> bool {
        self.records.iter().any(|r| r.strain == strain)
    }
}
