//! Outbreak Seeding and Skepticism Banding
//!
//! Picks the initial infected nodes per strain, then spreads an initial
//! skepticism distribution over the whole population.

use bevy_ecs::prelude::*;
use rand::seq::{index, SliceRandom};
use rand::Rng;

use strain_events::{InfectionRecord, NodeId, StrainIndex};

use crate::components::agent::{AgentState, InfectionLog};
use crate::components::network::NodeIndex;
use crate::components::strain::StrainTable;

/// Skepticism assigned to each quartile of the banding permutation
pub const SKEPTICISM_BANDS: [f64; 4] = [0.20, 0.40, 0.60, 0.80];

/// Seed every active strain, in strain order.
///
/// `outbreak_sizes[i]` distinct nodes are drawn for strain `i` (clamped to the
/// population). Each gets `infected` and `exposed` set, a seed provenance record,
/// and cross-immunity against the paired strain. Returns the seeded nodes per strain.
pub fn seed_outbreaks<R: Rng>(
    world: &mut World,
    rng: &mut R,
    node_index: &NodeIndex,
    strains: &StrainTable,
    outbreak_sizes: &[usize],
) -> Vec<Vec<NodeId>> {
    let population = node_index.len();
    let mut seeded = Vec::with_capacity(strains.active_count());

    for strain in strains.active() {
        let size = outbreak_sizes
            .get(strain.index())
            .copied()
            .unwrap_or(0)
            .min(population);
        let opposite = strains.opposite(strain);

        let chosen: Vec<NodeId> = index::sample(rng, population, size)
            .into_iter()
            .map(NodeId)
            .collect();

        for node in &chosen {
            let Some(entity) = node_index.entity(*node) else {
                continue;
            };
            if let Some(mut state) = world.get_mut::<AgentState>(entity) {
                state.seed(strain, opposite);
            }
            if let Some(mut log) = world.get_mut::<InfectionLog>(entity) {
                log.push(InfectionRecord::seeded(strain));
            }
        }

        tracing::debug!(strain = strain.index(), nodes = ?chosen, "seeded outbreak");
        seeded.push(chosen);
    }

    seeded
}

/// Skepticism for position `position` of a banding permutation over `population` nodes.
///
/// Boundaries are `⌊0.25N⌋`, `⌊0.50N⌋`, `⌊0.75N⌋`, inclusive on the upper side, so the
/// first band holds one extra node (26/25/25/24 for N = 100) and small populations can
/// leave the top band empty.
pub fn skepticism_band(position: usize, population: usize) -> f64 {
    let quartile = |fraction: f64| (population as f64 * fraction) as usize;
    let (q1, q2, q3) = (quartile(0.25), quartile(0.50), quartile(0.75));

    if position <= q1 {
        SKEPTICISM_BANDS[0]
    } else if position <= q2 {
        SKEPTICISM_BANDS[1]
    } else if position <= q3 {
        SKEPTICISM_BANDS[2]
    } else {
        SKEPTICISM_BANDS[3]
    }
}

/// Assign banded skepticism for every active strain, in strain order.
///
/// Each strain draws its own permutation of all nodes. Runs after seeding, so it
/// overwrites any cross-immunity level seeding applied.
pub fn assign_skepticism_bands<R: Rng>(
    world: &mut World,
    rng: &mut R,
    node_index: &NodeIndex,
    strains: &StrainTable,
) {
    let population = node_index.len();

    for strain in strains.active() {
        let mut order: Vec<NodeId> = (0..population).map(NodeId).collect();
        order.shuffle(rng);

        for (position, node) in order.into_iter().enumerate() {
            let level = skepticism_band(position, population);
            let Some(entity) = node_index.entity(node) else {
                continue;
            };
            if let Some(mut state) = world.get_mut::<AgentState>(entity) {
                state.set_skeptical_level(strain, level);
            }
        }
    }
}

/// Count how many agents hold each band level for `strain`.
pub fn band_counts(world: &World, node_index: &NodeIndex, strain: StrainIndex) -> [usize; 4] {
    let mut counts = [0; 4];
    for (_, entity) in node_index.iter() {
        let Some(state) = world.get::<AgentState>(entity) else {
            continue;
        };
        let level = state.strain(strain).skeptical_level;
        if let Some(band) = SKEPTICISM_BANDS.iter().position(|b| (b - level).abs() < 1e-9) {
            counts[band] += 1;
        }
    }
    counts
}
