//! Strain Simulation CLI
//!
//! Runs one seeded simulation of competing misinformation strains and writes
//! the per-tick streams and end-of-run reports to an output directory.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use strain_core::output::{
    self, RunWriter, CENTRALITY_FILE, EDGES_FILE, SPREADERS_FILE, SUMMARY_FILE,
};
use strain_core::{Config, Simulation};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "strain_sim")]
#[command(about = "Competing misinformation strains on a weighted contact network")]
struct Args {
    /// TOML configuration file; tuning.toml is used when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Number of nodes in the contact graph
    #[arg(long)]
    nodes: Option<i64>,

    /// How many of the configured strains take part
    #[arg(long)]
    active_strains: Option<usize>,

    /// Directory for export files
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Skip the per-agent dump stream
    #[arg(long)]
    no_agent_dumps: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    write_config: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(ticks) = self.ticks {
            config.simulation.ticks = ticks;
        }
        if let Some(nodes) = self.nodes {
            config.network.num_nodes = nodes;
        }
        if let Some(active) = self.active_strains {
            config.model.active_strains = active;
        }
        if self.no_agent_dumps {
            config.simulation.agent_dumps = false;
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if args.write_config {
        match Config::default().to_toml() {
            Ok(toml) => print!("{}", toml),
            Err(e) => {
                error!("Could not render default configuration: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            error!("Could not load {}: {}", path.display(), e);
            process::exit(1);
        }),
        None => Config::load_or_default(),
    };
    args.apply_overrides(&mut config);

    let ticks = config.simulation.ticks;
    let agent_dumps = config.simulation.agent_dumps;
    let mut sim = Simulation::new(config).unwrap_or_else(|e| {
        error!("Invalid configuration: {}", e);
        process::exit(1);
    });
    info!("{}", sim.spawn_summary().trim_end());

    let mut writer = RunWriter::new(&args.output_dir, agent_dumps).unwrap_or_else(|e| {
        warn!(
            "Could not create output directory {}: {}. Exports disabled.",
            args.output_dir.display(),
            e
        );
        RunWriter::null()
    });

    if let Err(e) = output::write_edge_list(args.output_dir.join(EDGES_FILE), sim.graph()) {
        warn!("Could not write edge list: {}", e);
    }

    if let Err(e) = writer.write_tick(sim.initial_report()) {
        warn!("Could not write tick 0: {}", e);
    }

    info!(ticks, "starting simulation");
    for _ in 0..ticks {
        let report = sim.step();
        if let Err(e) = writer.write_tick(&report) {
            warn!("Could not write tick {}: {}", report.tick, e);
        }

        if report.tick % 10 == 0 {
            let infected: Vec<String> = report
                .snapshots
                .iter()
                .map(|s| format!("{}={}", s.strain, s.infected.len()))
                .collect();
            info!(
                "[Tick {:>4}] infected {} | new infections {}",
                report.tick,
                infected.join(" "),
                report.new_infection_count()
            );
        }
    }

    if let Err(e) = writer.flush() {
        warn!("Could not flush tick streams: {}", e);
    }

    let summary = sim.summary();
    let dir = &args.output_dir;
    let reports = [
        (SPREADERS_FILE, output::write_json(dir.join(SPREADERS_FILE), &sim.spreaders())),
        (CENTRALITY_FILE, output::write_json(dir.join(CENTRALITY_FILE), &sim.centrality())),
        (SUMMARY_FILE, output::write_json(dir.join(SUMMARY_FILE), &summary)),
    ];
    for (file, result) in reports {
        if let Err(e) = result {
            warn!("Could not write {}: {}", file, e);
        }
    }

    println!();
    println!("Simulation complete. Ran {} ticks.", summary.ticks);
    for strain in &summary.strains {
        println!(
            "  {}: infected {}, exposed {}, naive {}, immune {}, total infections {}, \
             skeptical/susceptible {}",
            strain.name,
            strain.infected,
            strain.exposed,
            strain.naive,
            strain.immune,
            strain.total_infections,
            strain.skeptical_susceptible_ratio
        );
    }
    println!("Exports written to {}", args.output_dir.display());
}
