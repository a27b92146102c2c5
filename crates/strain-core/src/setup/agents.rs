//! Agent Spawning
//!
//! One agent per graph node, placed through the node index.

use bevy_ecs::prelude::*;

use strain_events::StrainIndex;

use crate::components::agent::{Agent, AgentState, InfectionLog, Node};
use crate::components::network::NodeIndex;
use crate::components::strain::StrainTable;

/// Spawn a naive agent on every node and return the node index.
///
/// Agents start with the configured per-strain skepticism.
pub fn spawn_agents(world: &mut World, num_nodes: usize, strains: &StrainTable) -> NodeIndex {
    let mut index = NodeIndex::new();
    let levels = strains.initial_skepticism();

    for _ in 0..num_nodes {
        let entity = world
            .spawn((Agent, AgentState::new(levels), InfectionLog::new()))
            .id();
        let node = index.place(entity);
        world.entity_mut(entity).insert(Node(node));
    }

    index
}

/// Get summary stats for the seeded population
pub fn get_spawn_summary(world: &World, strains: &StrainTable) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    let Some(index) = world.get_resource::<NodeIndex>() else {
        return summary;
    };

    summary.total_agents = index.len();
    for strain in strains.active() {
        let infected = index
            .iter()
            .filter_map(|(_, entity)| world.get::<AgentState>(entity))
            .filter(|state| state.strain(strain).infected)
            .count();
        summary.seeded.push((strain, infected));
    }
    summary
}

/// Summary of spawned agents
#[derive(Debug, Default)]
pub struct SpawnSummary {
    pub total_agents: usize,
    /// Infected agents per active strain right after seeding
    pub seeded: Vec<(StrainIndex, usize)>,
}

impl std::fmt::Display for SpawnSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total agents: {}", self.total_agents)?;
        for (strain, count) in &self.seeded {
            writeln!(f, "  strain {}: {} infected", strain, count)?;
        }
        Ok(())
    }
}
