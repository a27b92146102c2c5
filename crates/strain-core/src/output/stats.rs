//! Statistics Output
//!
//! End-of-run reports built from the final agent state and the provenance logs.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use strain_events::{
    InfectionEvent, NodeId, Ratio, RunSummary, SpreaderEntry, SpreaderReport, StrainIndex,
    StrainSummary,
};

use crate::components::agent::AgentState;
use crate::components::strain::StrainTable;
use crate::simulation::Simulation;
use crate::systems::{agents_in_node_order, strain_counts};

/// Per active strain, how many infections each source node caused.
///
/// Seeds are not spreaders. Entries are sorted by count descending, then node id.
pub fn spreader_reports(events: &[InfectionEvent], strains: &StrainTable) -> Vec<SpreaderReport> {
    strains
        .active()
        .map(|strain| {
            let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
            for event in events.iter().filter(|e| e.record.strain == strain) {
                if let Some(source) = event.record.source {
                    *counts.entry(source).or_insert(0) += 1;
                }
            }

            let mut spreaders: Vec<SpreaderEntry> = counts
                .into_iter()
                .map(|(node, infected)| SpreaderEntry { node, infected })
                .collect();
            spreaders.sort_by(|a, b| b.infected.cmp(&a.infected).then(a.node.cmp(&b.node)));

            SpreaderReport { strain, spreaders }
        })
        .collect()
}

/// Immune agents over susceptible ones for `strain`.
///
/// Immune means skepticism at 1.0. Susceptible means naive and not immune.
/// No susceptible agents gives [`Ratio::Infinite`].
pub fn skeptical_susceptible_ratio<'a>(
    agents: impl IntoIterator<Item = &'a AgentState>,
    strain: StrainIndex,
) -> Ratio {
    let (mut immune, mut susceptible) = (0, 0);
    for state in agents {
        let record = state.strain(strain);
        if record.is_immune() {
            immune += 1;
        } else if record.is_naive() {
            susceptible += 1;
        }
    }
    Ratio::of(immune, susceptible)
}

/// Summary of the run in its current state
pub fn run_summary(sim: &Simulation) -> RunSummary {
    let strains = sim.strains();
    let agents = agents_in_node_order(sim.world());
    let events = sim.infection_events();

    let summaries = strains
        .active()
        .map(|strain| {
            let counts = strain_counts(agents.iter().copied(), strain);
            StrainSummary {
                strain,
                name: strains.name(strain).to_string(),
                infected: counts.infected,
                exposed: counts.exposed,
                naive: counts.naive,
                immune: counts.immune,
                total_infections: events.iter().filter(|e| e.record.strain == strain).count(),
                skeptical_susceptible_ratio: skeptical_susceptible_ratio(
                    agents.iter().map(|(_, state)| *state),
                    strain,
                ),
            }
        })
        .collect();

    RunSummary {
        seed: sim.config().simulation.seed,
        ticks: sim.current_tick(),
        num_nodes: sim.node_count(),
        edge_count: sim.graph().edge_count(),
        active_strains: strains.active_count(),
        strains: summaries,
    }
}

/// Write any report as pretty JSON
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    fs::write(path, json)
}
