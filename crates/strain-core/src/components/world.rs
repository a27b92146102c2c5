//! World Resources
//!
//! Run-level state that is not attached to any agent.

use bevy_ecs::prelude::*;

use strain_events::InfectionEvent;

/// Global simulation state resource
#[derive(Resource, Debug, Clone, Default)]
pub struct SimulationState {
    /// Tick currently being simulated; 0 until the first tick starts
    pub current_tick: u64,
    /// Whether each tick report carries a full agent dump
    pub agent_dumps: bool,
}

impl SimulationState {
    pub fn new(agent_dumps: bool) -> Self {
        Self {
            current_tick: 0,
            agent_dumps,
        }
    }

    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }
}

/// Successful contact infections recorded during the current tick.
///
/// Filled by the diffusion system, drained by the tick hook.
#[derive(Resource, Debug, Default)]
pub struct TickInfections {
    events: Vec<InfectionEvent>,
}

impl TickInfections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InfectionEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<InfectionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
