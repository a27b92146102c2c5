//! Simulation Driver
//!
//! Builds the world from a validated configuration and steps it tick by tick.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;

use strain_events::{
    CentralityReport, InfectionEvent, InfectionRecord, NodeId, RunSummary, SpreaderReport,
    StrainIndex,
};

use crate::components::agent::{AgentState, InfectionLog};
use crate::components::network::{ContactGraph, NodeIndex};
use crate::components::strain::StrainTable;
use crate::components::world::{SimulationState, TickInfections};
use crate::config::{Config, ConfigError};
use crate::output::{centrality_report, run_summary, spreader_reports};
use crate::setup::{
    assign_skepticism_bands, build_contact_graph, get_spawn_summary, seed_outbreaks,
    spawn_agents, GraphSpec,
};
use crate::systems::{
    agents_in_node_order, build_tick_report, exposed_nodes, infected_nodes,
    not_infected_or_exposed, record_tick, step_agents, RandomActivation, TickReport, TickReports,
};
use crate::SimRng;

/// A fully set up run: the ECS world, its tick schedule and the configuration it came from.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    config: Config,
    initial: TickReport,
}

impl Simulation {
    /// Validate `config` and build the world, seeded from `config.simulation.seed`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut world = World::new();
        let mut rng = SmallRng::seed_from_u64(config.simulation.seed);
        let strains = StrainTable::from_config(&config);
        let num_nodes = config.node_count();

        let graph = build_contact_graph(
            &mut rng,
            &GraphSpec {
                num_nodes,
                avg_node_degree: config.network.avg_node_degree,
                weight: config.network.weight,
                include_self: config.network.include_self,
            },
        );

        let node_index = spawn_agents(&mut world, num_nodes, &strains);

        let outbreak_sizes: Vec<usize> = StrainIndex::range(strains.configured_count())
            .map(|strain| config.outbreak_size(strain))
            .collect();
        let seeded = seed_outbreaks(&mut world, &mut rng, &node_index, &strains, &outbreak_sizes);

        if config.skepticism.banded {
            assign_skepticism_bands(&mut world, &mut rng, &node_index, &strains);
        }

        let mut seed_infections = TickInfections::new();
        for (strain, nodes) in strains.active().zip(&seeded) {
            for node in nodes {
                seed_infections.push(InfectionEvent::new(*node, InfectionRecord::seeded(strain)));
            }
        }

        info!(
            nodes = num_nodes,
            edges = graph.edge_count(),
            active_strains = strains.active_count(),
            seed = config.simulation.seed,
            "world built"
        );

        world.insert_resource(graph);
        world.insert_resource(node_index);
        world.insert_resource(strains);
        world.insert_resource(SimRng(rng));
        world.insert_resource(SimulationState::new(config.simulation.agent_dumps));
        world.insert_resource(RandomActivation::new());
        world.insert_resource(seed_infections);
        world.insert_resource(TickReports::new());

        // Tick 0 is the post-seeding state; it drains the seed infections
        let initial = build_tick_report(&mut world);

        let mut schedule = Schedule::default();
        // Agents see each other's writes in activation order
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems((step_agents, record_tick).chain());

        Ok(Self {
            world,
            schedule,
            config,
            initial,
        })
    }

    /// Build with the configured parameters but a different seed
    pub fn with_seed(mut config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.simulation.seed = seed;
        Self::new(config)
    }

    /// Report for tick 0: the post-seeding state, with the seed infections
    pub fn initial_report(&self) -> &TickReport {
        &self.initial
    }

    /// Run one tick and return its report
    pub fn step(&mut self) -> TickReport {
        self.world.resource_mut::<SimulationState>().advance_tick();
        self.schedule.run(&mut self.world);
        self.take_latest_report()
    }

    /// Run `ticks` ticks, returning every report in order
    pub fn run(&mut self, ticks: u64) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step()).collect()
    }

    fn take_latest_report(&mut self) -> TickReport {
        let tick = self.current_tick();
        self.world
            .resource_mut::<TickReports>()
            .drain()
            .pop()
            .unwrap_or_else(|| TickReport {
                tick,
                ..Default::default()
            })
    }

    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimulationState>().current_tick
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &ContactGraph {
        self.world.resource::<ContactGraph>()
    }

    /// Mutable graph access, for changing edge weights between ticks
    pub fn graph_mut(&mut self) -> Mut<'_, ContactGraph> {
        self.world.resource_mut::<ContactGraph>()
    }

    pub fn strains(&self) -> &StrainTable {
        self.world.resource::<StrainTable>()
    }

    pub fn node_count(&self) -> usize {
        self.world.resource::<NodeIndex>().len()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn infected_nodes(&self, strain: StrainIndex) -> Vec<NodeId> {
        infected_nodes(agents_in_node_order(&self.world), strain)
    }

    pub fn exposed_nodes(&self, strain: StrainIndex) -> Vec<NodeId> {
        exposed_nodes(agents_in_node_order(&self.world), strain)
    }

    pub fn not_infected_or_exposed(&self, strain: StrainIndex) -> Vec<NodeId> {
        not_infected_or_exposed(agents_in_node_order(&self.world), strain)
    }

    pub fn agent_state(&self, node: NodeId) -> Option<&AgentState> {
        let entity = self.world.resource::<NodeIndex>().entity(node)?;
        self.world.get::<AgentState>(entity)
    }

    /// Mutable agent state, for preparing controlled scenarios
    pub fn agent_state_mut(&mut self, node: NodeId) -> Option<Mut<'_, AgentState>> {
        let entity = self.world.resource::<NodeIndex>().entity(node)?;
        self.world.get_mut::<AgentState>(entity)
    }

    /// Provenance records of the agent on `node`
    pub fn infection_log(&self, node: NodeId) -> Option<&InfectionLog> {
        let entity = self.world.resource::<NodeIndex>().entity(node)?;
        self.world.get::<InfectionLog>(entity)
    }

    /// Every provenance record, ordered by target node then by time
    pub fn infection_events(&self) -> Vec<InfectionEvent> {
        let node_index = self.world.resource::<NodeIndex>();
        node_index
            .iter()
            .filter_map(|(node, entity)| {
                let log = self.world.get::<InfectionLog>(entity)?;
                Some(log.records().iter().map(move |r| InfectionEvent::new(node, *r)))
            })
            .flatten()
            .collect()
    }

    pub fn summary(&self) -> RunSummary {
        run_summary(self)
    }

    pub fn spreaders(&self) -> Vec<SpreaderReport> {
        spreader_reports(&self.infection_events(), self.strains())
    }

    pub fn centrality(&self) -> CentralityReport {
        centrality_report(self.graph())
    }

    /// Human-readable population summary
    pub fn spawn_summary(&self) -> String {
        get_spawn_summary(&self.world, self.strains()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.network.num_nodes = 20;
        config
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = small_config();
        config.network.num_nodes = 0;
        assert!(matches!(
            Simulation::new(config),
            Err(ConfigError::InvalidNodeCount(0))
        ));
    }

    #[test]
    fn test_initial_report_is_post_seeding() {
        let sim = Simulation::new(small_config()).unwrap();
        let report = sim.initial_report();

        assert_eq!(report.tick, 0);
        assert_eq!(report.snapshots.len(), 2);
        assert_eq!(report.infections.len(), 2);
        assert!(report.infections.iter().all(|e| e.record.is_seed()));
        assert_eq!(report.snapshots[0].infected, sim.infected_nodes(StrainIndex(0)));
    }

    #[test]
    fn test_step_advances_tick() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let reports = sim.run(3);

        assert_eq!(reports.iter().map(|r| r.tick).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(sim.current_tick(), 3);
        assert!(sim.world().resource::<TickReports>().is_empty());
    }

    #[test]
    fn test_every_agent_activated_each_tick() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.step();

        let mut order = sim.world().resource::<RandomActivation>().last_order().to_vec();
        order.sort();
        assert_eq!(order, (0..20).map(NodeId).collect::<Vec<_>>());
    }

    #[test]
    fn test_infection_events_cover_logs() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.run(10);

        let events = sim.infection_events();
        let logged: usize = (0..20)
            .filter_map(|i| sim.infection_log(NodeId(i)))
            .map(|log| log.len())
            .sum();
        assert_eq!(events.len(), logged);
    }
}
