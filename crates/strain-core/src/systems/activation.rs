//! Random Activation
//!
//! Every tick each agent acts exactly once, in a freshly shuffled order.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use strain_events::NodeId;

use crate::components::network::{ContactGraph, NodeIndex};
use crate::components::strain::StrainTable;
use crate::components::world::{SimulationState, TickInfections};
use crate::SimRng;

use super::diffusion::{step_agent, AgentQuery, TickContext};

/// Uniform random permutation of all nodes
pub fn activation_order<R: Rng>(rng: &mut R, population: usize) -> Vec<NodeId> {
    let mut order: Vec<NodeId> = (0..population).map(NodeId).collect();
    order.shuffle(rng);
    order
}

/// Scheduler resource holding the permutation used by the latest tick
#[derive(Resource, Debug, Clone, Default)]
pub struct RandomActivation {
    order: Vec<NodeId>,
}

impl RandomActivation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a new order for `population` agents
    pub fn reshuffle<R: Rng>(&mut self, rng: &mut R, population: usize) -> &[NodeId] {
        self.order = activation_order(rng, population);
        &self.order
    }

    pub fn last_order(&self) -> &[NodeId] {
        &self.order
    }
}

/// System: step every agent once, in a new random order.
///
/// Agents run to completion one at a time, and their writes are visible to every
/// agent activated after them in the same tick.
pub fn step_agents(
    mut rng: ResMut<SimRng>,
    mut activation: ResMut<RandomActivation>,
    graph: Res<ContactGraph>,
    strains: Res<StrainTable>,
    node_index: Res<NodeIndex>,
    sim_state: Res<SimulationState>,
    mut infections: ResMut<TickInfections>,
    mut agents: AgentQuery,
) {
    let order = activation.reshuffle(&mut rng.0, node_index.len()).to_vec();

    let mut ctx = TickContext {
        rng: &mut rng.0,
        graph: &graph,
        strains: &strains,
        node_index: &node_index,
        step: sim_state.current_tick,
        infections: &mut infections,
    };

    for actor in order {
        step_agent(&mut ctx, &mut agents, actor);
    }
}
