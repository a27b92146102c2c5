//! Export tests
//!
//! Drive a full run into a temporary output directory and read every file back.

use std::fs;

use strain_core::output::{
    edge_list_string, write_edge_list, write_json, RunWriter, AGENTS_FILE, CENTRALITY_FILE,
    COUNTS_FILE, EDGES_FILE, INFECTIONS_FILE, SPREADERS_FILE, SPREAD_FILE, SUMMARY_FILE,
};
use strain_core::{Config, Simulation};
use strain_events::{
    AgentDump, CentralityReport, RunSummary, SpreaderReport, StrainSnapshot, TickCounts,
};

const TICKS: u64 = 12;

fn run_into(dir: &std::path::Path, agent_dumps: bool) -> Simulation {
    let mut config = Config::default();
    config.network.num_nodes = 30;
    config.simulation.agent_dumps = agent_dumps;
    for strain in config.strains.iter_mut() {
        strain.initial_outbreak_size = 2;
    }

    let mut sim = Simulation::new(config).unwrap();
    let mut writer = RunWriter::new(dir, agent_dumps).unwrap();
    write_edge_list(dir.join(EDGES_FILE), sim.graph()).unwrap();

    writer.write_tick(sim.initial_report()).unwrap();
    for _ in 0..TICKS {
        let report = sim.step();
        writer.write_tick(&report).unwrap();
    }
    writer.flush().unwrap();

    write_json(dir.join(SPREADERS_FILE), &sim.spreaders()).unwrap();
    write_json(dir.join(CENTRALITY_FILE), &sim.centrality()).unwrap();
    write_json(dir.join(SUMMARY_FILE), &sim.summary()).unwrap();
    sim
}

#[test]
fn test_tick_streams() {
    let dir = tempfile::tempdir().unwrap();
    let sim = run_into(dir.path(), true);

    let spread = fs::read_to_string(dir.path().join(SPREAD_FILE)).unwrap();
    let snapshots: Vec<StrainSnapshot> = spread
        .lines()
        .map(|line| StrainSnapshot::from_jsonl(line).unwrap())
        .collect();
    assert_eq!(snapshots.len() as u64, (TICKS + 1) * 2);
    assert_eq!(snapshots[0].tick, 0);
    assert_eq!(snapshots.last().map(|s| s.tick), Some(TICKS));
    assert!(snapshots.iter().all(|s| s.population() == 30));

    let counts = fs::read_to_string(dir.path().join(COUNTS_FILE)).unwrap();
    let counts: Vec<TickCounts> = counts
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(counts.len() as u64, TICKS + 1);

    let agents = fs::read_to_string(dir.path().join(AGENTS_FILE)).unwrap();
    let dumps: Vec<AgentDump> = agents
        .lines()
        .map(|line| AgentDump::from_jsonl(line).unwrap())
        .collect();
    assert_eq!(dumps.len() as u64, (TICKS + 1) * 30);

    // The final dump agrees with the live state
    let last = &dumps[dumps.len() - 30..];
    for dump in last {
        let state = sim.agent_state(dump.node).unwrap();
        for strain in &dump.strains {
            assert_eq!(state.strain(strain.strain).infected, strain.infected);
        }
    }
}

#[test]
fn test_provenance_csv_matches_logs() {
    let dir = tempfile::tempdir().unwrap();
    let sim = run_into(dir.path(), false);

    let csv = fs::read_to_string(dir.path().join(INFECTIONS_FILE)).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("target,source,strain,step"));

    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), sim.infection_events().len());

    // Seeds come first, with an empty source at step 0
    assert!(rows[0].contains(",,"));
    assert!(rows[0].ends_with(",0"));
    assert!(!dir.path().join(AGENTS_FILE).exists());
}

#[test]
fn test_final_reports() {
    let dir = tempfile::tempdir().unwrap();
    let sim = run_into(dir.path(), false);

    let edges = fs::read_to_string(dir.path().join(EDGES_FILE)).unwrap();
    assert_eq!(edges, edge_list_string(sim.graph()));
    assert!(edges.starts_with('|') && edges.ends_with('|'));

    let summary: RunSummary =
        serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary, sim.summary());
    assert_eq!(summary.ticks, TICKS);
    assert_eq!(summary.strains.len(), 2);
    assert_eq!(summary.strains[0].name, "virus_0");

    let spreaders: Vec<SpreaderReport> =
        serde_json::from_str(&fs::read_to_string(dir.path().join(SPREADERS_FILE)).unwrap())
            .unwrap();
    for report in &spreaders {
        let total: usize = report.spreaders.iter().map(|s| s.infected).sum();
        let summary = &summary.strains[report.strain.index()];
        // Contact infections plus seeds account for every infection
        assert!(total <= summary.total_infections);
        assert!(report.spreaders.windows(2).all(|w| w[0].infected >= w[1].infected));
    }

    let centrality: CentralityReport =
        serde_json::from_str(&fs::read_to_string(dir.path().join(CENTRALITY_FILE)).unwrap())
            .unwrap();
    assert_eq!(centrality.nodes.len(), 30);
    assert!(centrality.nodes.iter().all(|c| (0.0..=1.0).contains(&c.betweenness)));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tuning.toml");

    let mut config = Config::default();
    config.simulation.seed = 1234;
    config.network.num_nodes = 75;
    fs::write(&path, config.to_toml().unwrap()).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}
