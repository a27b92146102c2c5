//! Diffusion
//!
//! What a single agent does when activated. For every active strain, in index order:
//!
//! 1. **Exposure**: an infected agent exposes each naive neighbor with probability
//!    equal to its own skepticism for that strain.
//! 2. **Check-and-act**: one draw against `check_frequency` decides between
//!    spreading (if infected) and a skepticism-gain draw (if exposed).
//!
//! Spreading tries every exposed-only neighbor: the contact must pass
//! `spread_chance * weight`, then the target must fail its skepticism check.
//! A successful infection clears the target's exposure, logs its provenance and
//! pushes the target's paired strain to at least the cross-immunity level.

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::trace;

use strain_events::{InfectionEvent, InfectionRecord, NodeId, StrainIndex};

use crate::components::agent::{AgentState, InfectionLog, StrainRecord};
use crate::components::network::{ContactGraph, NodeIndex};
use crate::components::strain::StrainTable;
use crate::components::world::TickInfections;

/// Query over every agent's mutable state
pub type AgentQuery<'w, 's> = Query<'w, 's, (&'static mut AgentState, &'static mut InfectionLog)>;

/// A state change one agent applies to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transmission {
    /// Expose a naive target
    Expose { strain: StrainIndex },
    /// Infect an exposed target on behalf of `source`
    Infect {
        strain: StrainIndex,
        source: NodeId,
        step: u64,
        opposite: Option<StrainIndex>,
    },
}

/// Apply a transmission to its target.
///
/// Returns the provenance record when an infection took hold. Transmissions whose
/// precondition no longer holds are dropped.
pub fn apply_transmission(
    state: &mut AgentState,
    log: &mut InfectionLog,
    transmission: Transmission,
) -> Option<InfectionRecord> {
    match transmission {
        Transmission::Expose { strain } => {
            state.receive_exposure(strain);
            None
        }
        Transmission::Infect {
            strain,
            source,
            step,
            opposite,
        } => {
            if !state.receive_infection(strain, opposite) {
                return None;
            }
            let record = InfectionRecord::contact(source, strain, step);
            log.push(record);
            Some(record)
        }
    }
}

/// Everything an activated agent reads or writes besides agent state
pub struct TickContext<'a, R: Rng> {
    pub rng: &'a mut R,
    pub graph: &'a ContactGraph,
    pub strains: &'a StrainTable,
    pub node_index: &'a NodeIndex,
    /// Current tick, stamped on provenance records
    pub step: u64,
    pub infections: &'a mut TickInfections,
}

/// Run one agent's full turn
pub fn step_agent<R: Rng>(ctx: &mut TickContext<'_, R>, agents: &mut AgentQuery, actor: NodeId) {
    let Some(entity) = ctx.node_index.entity(actor) else {
        return;
    };

    let strains = ctx.strains;
    for strain in strains.active() {
        expose_neighbors(ctx, agents, actor, entity, strain);
        check_and_act(ctx, agents, actor, entity, strain);
    }
}

/// The actor's current record, re-read so earlier phases are visible
fn actor_record(agents: &AgentQuery, entity: Entity, strain: StrainIndex) -> Option<StrainRecord> {
    agents.get(entity).ok().map(|(state, _)| *state.strain(strain))
}

fn expose_neighbors<R: Rng>(
    ctx: &mut TickContext<'_, R>,
    agents: &mut AgentQuery,
    actor: NodeId,
    entity: Entity,
    strain: StrainIndex,
) {
    let Some(record) = actor_record(agents, entity, strain) else {
        return;
    };
    if !record.infected {
        return;
    }

    let graph = ctx.graph;
    for edge in graph.neighbors(actor) {
        let Some(target) = ctx.node_index.entity(edge.target) else {
            continue;
        };
        let Ok((mut state, mut log)) = agents.get_mut(target) else {
            continue;
        };
        if !state.strain(strain).is_naive() {
            continue;
        }
        if ctx.rng.gen::<f64>() < record.skeptical_level {
            apply_transmission(&mut state, &mut log, Transmission::Expose { strain });
        }
    }
}

fn check_and_act<R: Rng>(
    ctx: &mut TickContext<'_, R>,
    agents: &mut AgentQuery,
    actor: NodeId,
    entity: Entity,
    strain: StrainIndex,
) {
    let Some(record) = actor_record(agents, entity, strain) else {
        return;
    };
    let params = ctx.strains.get(strain);
    let (check_frequency, gain_chance) = (params.check_frequency, params.gain_skeptical_chance);

    if ctx.rng.gen::<f64>() < check_frequency {
        if record.infected {
            spread_to_neighbors(ctx, agents, actor, strain);
        }
    } else if record.exposed && ctx.rng.gen::<f64>() < gain_chance {
        if let Ok((mut state, _)) = agents.get_mut(entity) {
            let level = state.strain_mut(strain).gain_skepticism();
            trace!(node = actor.index(), strain = strain.index(), level, "skepticism gained");
        }
    }
}

fn spread_to_neighbors<R: Rng>(
    ctx: &mut TickContext<'_, R>,
    agents: &mut AgentQuery,
    actor: NodeId,
    strain: StrainIndex,
) {
    let spread_chance = ctx.strains.get(strain).spread_chance;
    let opposite = ctx.strains.opposite(strain);

    let graph = ctx.graph;
    for edge in graph.neighbors(actor) {
        let Some(target) = ctx.node_index.entity(edge.target) else {
            continue;
        };
        let Ok((mut state, mut log)) = agents.get_mut(target) else {
            continue;
        };
        let target_record = *state.strain(strain);
        if !target_record.is_exposed_only() {
            continue;
        }

        // The skepticism draw only happens once the contact itself succeeds
        if ctx.rng.gen::<f64>() >= spread_chance * edge.weight {
            continue;
        }
        if ctx.rng.gen::<f64>() <= target_record.skeptical_level {
            continue;
        }

        let transmission = Transmission::Infect {
            strain,
            source: actor,
            step: ctx.step,
            opposite,
        };
        if let Some(record) = apply_transmission(&mut state, &mut log, transmission) {
            trace!(
                source = actor.index(),
                target = edge.target.index(),
                strain = strain.index(),
                step = ctx.step,
                "infection"
            );
            ctx.infections.push(InfectionEvent::new(edge.target, record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::{Agent, Node, CROSS_IMMUNITY_LEVEL};
    use crate::config::StrainConfig;
    use bevy_ecs::system::SystemState;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const S0: StrainIndex = StrainIndex(0);
    const S1: StrainIndex = StrainIndex(1);

    fn certain_strain(name: &str) -> StrainConfig {
        let mut strain = StrainConfig::named(name);
        strain.spread_chance = 1.0;
        strain.check_frequency = 1.0;
        strain.skeptical_level = 0.0;
        strain
    }

    /// World with a path graph 0-1-2, weight 1.0, and one agent per node
    fn path_world(strains: StrainTable) -> (World, NodeIndex, ContactGraph) {
        let mut world = World::new();
        let mut index = NodeIndex::new();
        for i in 0..3 {
            let entity = world
                .spawn((
                    Agent,
                    AgentState::new(strains.initial_skepticism()),
                    InfectionLog::new(),
                ))
                .id();
            let node = index.place(entity);
            world.entity_mut(entity).insert(Node(node));
            assert_eq!(node, NodeId(i));
        }

        let mut graph = ContactGraph::with_nodes(3);
        for (a, b) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
            graph.insert_edge(NodeId(a), NodeId(b), 1.0);
        }
        world.insert_resource(strains);
        (world, index, graph)
    }

    fn state_mut<'a>(world: &'a mut World, index: &NodeIndex, node: usize) -> Mut<'a, AgentState> {
        let entity = index.entity(NodeId(node)).unwrap();
        world.get_mut::<AgentState>(entity).unwrap()
    }

    fn run_turn(
        world: &mut World,
        index: &NodeIndex,
        graph: &ContactGraph,
        actor: usize,
        step: u64,
    ) -> Vec<InfectionEvent> {
        run_turns(world, index, graph, &[actor], step)
    }

    /// Several agents acting in order within one tick
    fn run_turns(
        world: &mut World,
        index: &NodeIndex,
        graph: &ContactGraph,
        actors: &[usize],
        step: u64,
    ) -> Vec<InfectionEvent> {
        let strains = world.remove_resource::<StrainTable>().unwrap();
        let mut infections = TickInfections::new();
        let mut rng = SmallRng::seed_from_u64(3);
        {
            let mut system_state: SystemState<AgentQuery> = SystemState::new(world);
            let mut agents = system_state.get_mut(world);
            let mut ctx = TickContext {
                rng: &mut rng,
                graph,
                strains: &strains,
                node_index: index,
                step,
                infections: &mut infections,
            };
            for &actor in actors {
                step_agent(&mut ctx, &mut agents, NodeId(actor));
            }
        }
        world.insert_resource(strains);
        infections.drain()
    }

    #[test]
    fn test_apply_exposure_only_touches_naive() {
        let mut state = AgentState::default();
        let mut log = InfectionLog::new();

        assert_eq!(apply_transmission(&mut state, &mut log, Transmission::Expose { strain: S0 }), None);
        assert!(state.strain(S0).exposed);
        assert!(log.is_empty());
    }

    #[test]
    fn test_apply_infection_logs_provenance() {
        let mut state = AgentState::new([0.0, 0.3, 0.0]);
        state.strain_mut(S0).exposed = true;
        let mut log = InfectionLog::new();

        let transmission = Transmission::Infect {
            strain: S0,
            source: NodeId(9),
            step: 4,
            opposite: Some(S1),
        };
        let record = apply_transmission(&mut state, &mut log, transmission).unwrap();

        assert_eq!(record, InfectionRecord::contact(NodeId(9), S0, 4));
        assert_eq!(log.records(), &[record]);
        assert_eq!(state.strain(S1).skeptical_level, CROSS_IMMUNITY_LEVEL);

        // A second attempt finds the target already infected
        assert_eq!(apply_transmission(&mut state, &mut log, transmission), None);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_immune_spreader_exposes_all_naive_neighbors() {
        let (mut world, index, graph) = path_world(StrainTable::new(vec![certain_strain("a")], 1));
        {
            let mut seed = state_mut(&mut world, &index, 1);
            seed.seed(S0, None);
            seed.set_skeptical_level(S0, 1.0);
        }

        let infections = run_turn(&mut world, &index, &graph, 1, 1);

        // Exposure happens first, so the same turn also infects both neighbors
        assert_eq!(infections.len(), 2);
        for node in [0, 2] {
            let record = *state_mut(&mut world, &index, node).strain(S0);
            assert!(record.infected);
            assert!(!record.exposed);
        }
        assert!(infections.iter().all(|e| e.record.source == Some(NodeId(1))));
        assert!(infections.iter().all(|e| e.record.step == 1));
    }

    /// Node 0 infected and fully skeptical, nodes 1 and 2 exposed with no skepticism
    fn relay_world() -> (World, NodeIndex, ContactGraph) {
        let (mut world, index, graph) = path_world(StrainTable::new(vec![certain_strain("a")], 1));
        {
            let mut seed = state_mut(&mut world, &index, 0);
            seed.seed(S0, None);
            seed.set_skeptical_level(S0, 1.0);
        }
        for node in [1, 2] {
            state_mut(&mut world, &index, node).strain_mut(S0).exposed = true;
        }
        (world, index, graph)
    }

    #[test]
    fn test_later_actor_sees_earlier_infection_in_same_tick() {
        let (mut world, index, graph) = relay_world();

        let infections = run_turns(&mut world, &index, &graph, &[0, 1], 1);

        let relayed = state_mut(&mut world, &index, 2).strain(S0).infected;
        assert!(relayed);
        let sources: Vec<_> = infections.iter().map(|e| (e.target, e.record.source)).collect();
        assert_eq!(
            sources,
            vec![(NodeId(1), Some(NodeId(0))), (NodeId(2), Some(NodeId(1)))]
        );
    }

    #[test]
    fn test_earlier_actor_misses_later_infection_in_same_tick() {
        let (mut world, index, graph) = relay_world();

        let infections = run_turns(&mut world, &index, &graph, &[1, 0], 1);

        assert_eq!(infections.len(), 1);
        assert_eq!(infections[0].record.source, Some(NodeId(0)));
        assert!(state_mut(&mut world, &index, 1).strain(S0).infected);
        let end = *state_mut(&mut world, &index, 2).strain(S0);
        assert!(!end.infected);
        assert!(end.exposed);
    }

    #[test]
    fn test_zero_skepticism_spreader_never_exposes() {
        let (mut world, index, graph) = path_world(StrainTable::new(vec![certain_strain("a")], 1));
        state_mut(&mut world, &index, 1).seed(S0, None);

        let infections = run_turn(&mut world, &index, &graph, 1, 1);

        assert!(infections.is_empty());
        assert!(state_mut(&mut world, &index, 0).strain(S0).is_naive());
    }

    #[test]
    fn test_fully_skeptical_target_resists() {
        let (mut world, index, graph) = path_world(StrainTable::new(vec![certain_strain("a")], 1));
        state_mut(&mut world, &index, 1).seed(S0, None);
        for node in [0, 2] {
            let mut target = state_mut(&mut world, &index, node);
            target.strain_mut(S0).exposed = true;
            target.set_skeptical_level(S0, 1.0);
        }

        let infections = run_turn(&mut world, &index, &graph, 1, 1);
        assert!(infections.is_empty());
    }

    #[test]
    fn test_exposed_agent_gains_skepticism_when_not_checking() {
        let mut strain = certain_strain("a");
        strain.check_frequency = 0.0;
        strain.gain_skeptical_chance = 1.0;
        let (mut world, index, graph) = path_world(StrainTable::new(vec![strain], 1));
        {
            let mut agent = state_mut(&mut world, &index, 0);
            agent.strain_mut(S0).exposed = true;
            agent.set_skeptical_level(S0, 0.5);
        }

        run_turn(&mut world, &index, &graph, 0, 1);

        let level = state_mut(&mut world, &index, 0).strain(S0).skeptical_level;
        assert!((level - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_infection_excludes_opposite_strain() {
        let strains = StrainTable::new(
            vec![certain_strain("a").with_opposite(1), certain_strain("b").with_opposite(0)],
            2,
        );
        let (mut world, index, graph) = path_world(strains);
        state_mut(&mut world, &index, 1).seed(S0, Some(S1));
        {
            let mut target = state_mut(&mut world, &index, 0);
            target.strain_mut(S0).exposed = true;
            target.strain_mut(S1).infected = true;
        }

        run_turn(&mut world, &index, &graph, 1, 2);

        let target = *state_mut(&mut world, &index, 0);
        assert!(target.strain(S0).infected);
        assert!(!target.strain(S1).infected);
        assert!(target.strain(S1).skeptical_level >= CROSS_IMMUNITY_LEVEL);
    }
}
