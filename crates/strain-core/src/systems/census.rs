//! Census
//!
//! Read-only queries over agent state. Every call walks the population in node
//! order and reflects the state at the moment it is made.

use bevy_ecs::prelude::*;

use strain_events::{NodeId, PairCounts, StrainCounts, StrainIndex, StrainSnapshot, TickCounts};

use crate::components::agent::AgentState;
use crate::components::network::NodeIndex;
use crate::components::strain::StrainTable;

/// Every agent's state in node-id order
pub fn agents_in_node_order(world: &World) -> Vec<(NodeId, &AgentState)> {
    let Some(node_index) = world.get_resource::<NodeIndex>() else {
        return Vec::new();
    };
    node_index
        .iter()
        .filter_map(|(node, entity)| world.get::<AgentState>(entity).map(|state| (node, state)))
        .collect()
}

/// Nodes currently infected with `strain`
pub fn infected_nodes<'a>(
    agents: impl IntoIterator<Item = (NodeId, &'a AgentState)>,
    strain: StrainIndex,
) -> Vec<NodeId> {
    agents
        .into_iter()
        .filter(|(_, state)| state.strain(strain).infected)
        .map(|(node, _)| node)
        .collect()
}

/// Nodes exposed to `strain` but not infected
pub fn exposed_nodes<'a>(
    agents: impl IntoIterator<Item = (NodeId, &'a AgentState)>,
    strain: StrainIndex,
) -> Vec<NodeId> {
    agents
        .into_iter()
        .filter(|(_, state)| state.strain(strain).is_exposed_only())
        .map(|(node, _)| node)
        .collect()
}

/// Nodes neither infected with nor exposed to `strain`
pub fn not_infected_or_exposed<'a>(
    agents: impl IntoIterator<Item = (NodeId, &'a AgentState)>,
    strain: StrainIndex,
) -> Vec<NodeId> {
    agents
        .into_iter()
        .filter(|(_, state)| state.strain(strain).is_naive())
        .map(|(node, _)| node)
        .collect()
}

pub fn strain_counts<'a>(
    agents: impl IntoIterator<Item = (NodeId, &'a AgentState)>,
    strain: StrainIndex,
) -> StrainCounts {
    let mut counts = StrainCounts {
        strain,
        ..Default::default()
    };
    for (_, state) in agents {
        let record = state.strain(strain);
        if record.infected {
            counts.infected += 1;
        } else if record.exposed {
            counts.exposed += 1;
        } else {
            counts.naive += 1;
        }
        if record.is_immune() {
            counts.immune += 1;
        }
    }
    counts
}

/// Combined states of each agent for two opposite strains
pub fn pair_counts<'a>(
    agents: impl IntoIterator<Item = (NodeId, &'a AgentState)>,
    first: StrainIndex,
    second: StrainIndex,
) -> PairCounts {
    let mut counts = PairCounts {
        first,
        second,
        ..Default::default()
    };
    for (_, state) in agents {
        let a = state.strain(first);
        let b = state.strain(second);
        match (a.infected, a.is_exposed_only(), b.infected, b.is_exposed_only()) {
            (true, _, false, false) => counts.infected_first += 1,
            (true, _, false, true) => counts.infected_first_exposed_second += 1,
            (false, false, true, _) => counts.infected_second += 1,
            (false, true, true, _) => counts.infected_second_exposed_first += 1,
            (false, true, false, true) => counts.exposed_both += 1,
            (false, true, false, false) => counts.exposed_first += 1,
            (false, false, false, true) => counts.exposed_second += 1,
            _ => {}
        }
    }
    counts
}

/// Active strain pairs linked as opposites, lower index first
pub fn opposite_pairs(strains: &StrainTable) -> Vec<(StrainIndex, StrainIndex)> {
    strains
        .active()
        .filter_map(|strain| {
            strains
                .opposite(strain)
                .filter(|other| *other > strain && other.index() < strains.active_count())
                .map(|other| (strain, other))
        })
        .collect()
}

/// The three node sets for one strain
pub fn strain_snapshot(
    agents: &[(NodeId, &AgentState)],
    tick: u64,
    strain: StrainIndex,
) -> StrainSnapshot {
    StrainSnapshot {
        tick,
        strain,
        infected: infected_nodes(agents.iter().copied(), strain),
        exposed: exposed_nodes(agents.iter().copied(), strain),
        naive: not_infected_or_exposed(agents.iter().copied(), strain),
    }
}

/// Population counts across the active strains
pub fn tick_counts(
    agents: &[(NodeId, &AgentState)],
    strains: &StrainTable,
    tick: u64,
) -> TickCounts {
    let per_strain = strains
        .active()
        .map(|strain| strain_counts(agents.iter().copied(), strain))
        .collect();

    let susceptible = agents
        .iter()
        .filter(|(_, state)| strains.active().all(|s| state.strain(s).is_naive()))
        .count();
    let skeptical = agents
        .iter()
        .filter(|(_, state)| {
            strains.active_count() > 0 && strains.active().all(|s| state.strain(s).is_immune())
        })
        .count();
    let pairs = opposite_pairs(strains)
        .into_iter()
        .map(|(first, second)| pair_counts(agents.iter().copied(), first, second))
        .collect();

    TickCounts {
        tick,
        strains: per_strain,
        pairs,
        susceptible,
        skeptical,
    }
}
