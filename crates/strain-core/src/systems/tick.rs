//! Tick Hook
//!
//! Runs after every agent has acted. Captures the per-strain node sets, counts,
//! the infections recorded during the tick and, optionally, a full agent dump.

use bevy_ecs::prelude::*;
use tracing::debug;

use strain_events::{AgentDump, InfectionEvent, StrainSnapshot, TickCounts};

use crate::components::agent::{AgentState, InfectionLog};
use crate::components::network::NodeIndex;
use crate::components::strain::StrainTable;
use crate::components::world::{SimulationState, TickInfections};

use super::census::{agents_in_node_order, strain_snapshot, tick_counts};

/// Everything observed at the end of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// One snapshot per active strain, in strain order
    pub snapshots: Vec<StrainSnapshot>,
    pub counts: TickCounts,
    /// Infections that happened during this tick, in the order they happened
    pub infections: Vec<InfectionEvent>,
    /// Empty when agent dumps are disabled
    pub agents: Vec<AgentDump>,
}

impl TickReport {
    pub fn new_infection_count(&self) -> usize {
        self.infections.len()
    }
}

/// Reports produced by the tick hook and not yet collected
#[derive(Resource, Debug, Default)]
pub struct TickReports {
    reports: Vec<TickReport>,
}

impl TickReports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: TickReport) {
        self.reports.push(report);
    }

    pub fn drain(&mut self) -> Vec<TickReport> {
        std::mem::take(&mut self.reports)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Build the report for the current tick, draining the tick's infections.
pub fn build_tick_report(world: &mut World) -> TickReport {
    let infections = world
        .get_resource_mut::<TickInfections>()
        .map(|mut pending| pending.drain())
        .unwrap_or_default();

    let world: &World = world;
    let (tick, agent_dumps) = world
        .get_resource::<SimulationState>()
        .map(|state| (state.current_tick, state.agent_dumps))
        .unwrap_or_default();
    let Some(strains) = world.get_resource::<StrainTable>() else {
        return TickReport {
            tick,
            infections,
            ..Default::default()
        };
    };

    let agents = agents_in_node_order(world);
    let snapshots = strains
        .active()
        .map(|strain| strain_snapshot(&agents, tick, strain))
        .collect();
    let counts = tick_counts(&agents, strains, tick);

    let dumps = if agent_dumps {
        agent_dumps_at(world, strains, tick)
    } else {
        Vec::new()
    };

    TickReport {
        tick,
        snapshots,
        counts,
        infections,
        agents: dumps,
    }
}

fn agent_dumps_at(world: &World, strains: &StrainTable, tick: u64) -> Vec<AgentDump> {
    let Some(node_index) = world.get_resource::<NodeIndex>() else {
        return Vec::new();
    };
    node_index
        .iter()
        .filter_map(|(node, entity)| {
            let state = world.get::<AgentState>(entity)?;
            let infections = world
                .get::<InfectionLog>(entity)
                .map(|log| log.records().to_vec())
                .unwrap_or_default();
            Some(AgentDump {
                tick,
                node,
                strains: state.snapshot(strains.active_count()),
                infections,
            })
        })
        .collect()
}

/// Exclusive system: the model-level hook run once per tick after all agents.
pub fn record_tick(world: &mut World) {
    let report = build_tick_report(world);

    for counts in &report.counts.strains {
        debug!(
            tick = report.tick,
            strain = counts.strain.index(),
            infected = counts.infected,
            exposed = counts.exposed,
            naive = counts.naive,
            immune = counts.immune,
            "strain counts"
        );
    }
    debug!(
        tick = report.tick,
        new_infections = report.new_infection_count(),
        susceptible = report.counts.susceptible,
        skeptical = report.counts.skeptical,
        "tick complete"
    );

    world.get_resource_or_insert_with(TickReports::new).push(report);
}
