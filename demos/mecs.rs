//! Maximal end components of a random MDP.
//!
//! Generates a random state graph, enumerates its components one by one and
//! optionally writes the graph with the components highlighted as DOT.
//!
//! Run with: `cargo run --example mecs`
//! With options: `cargo run --example mecs -- -n 50 --mode scc --dot mecs.dot`

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use mec_rs::bitset::BitSet;
use mec_rs::graph::{GraphBuilder, MdpGraph};
use mec_rs::types::{ComponentMode, Objective, Role, Scheduler};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Scc,
    Mec,
}

impl From<Mode> for ComponentMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Scc => ComponentMode::Scc,
            Mode::Mec => ComponentMode::Mec,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mecs")]
#[command(about = "Enumerate end components of a random MDP")]
struct Args {
    /// Number of nodes
    #[arg(short, long, default_value_t = 20)]
    nodes: usize,

    /// Fraction of controlled nodes
    #[arg(short, long, default_value_t = 0.6)]
    controlled: f64,

    /// Maximum number of successors per node
    #[arg(short = 'd', long, default_value_t = 3)]
    max_degree: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// What to enumerate
    #[arg(short, long, value_enum, default_value_t = Mode::Mec)]
    mode: Mode,

    /// Log level
    #[arg(short, long, default_value_t = log::LevelFilter::Info)]
    log_level: log::LevelFilter,

    /// Write the graph in DOT format to this file
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn random_mdp(args: &Args) -> MdpGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut builder = GraphBuilder::with_capacity(args.nodes, args.nodes * args.max_degree);
    for _ in 0..args.nodes {
        let role = if rng.random_bool(args.controlled) {
            Role::Controlled
        } else {
            Role::Probabilistic
        };
        let degree = rng.random_range(1..=args.max_degree);
        builder.add_node(role, (0..degree).map(|_| rng.random_range(0..args.nodes)).collect::<Vec<_>>());
    }
    builder.build()
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    color_eyre::eyre::ensure!(args.nodes > 0, "need at least one node");
    color_eyre::eyre::ensure!(args.max_degree > 0, "need at least one successor per node");
    color_eyre::eyre::ensure!(
        (0.0..=1.0).contains(&args.controlled),
        "controlled fraction must lie in [0, 1]"
    );

    simplelog::TermLogger::init(
        args.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let graph = random_mdp(&args);
    println!("graph = {:?}", graph);

    let mode = ComponentMode::from(args.mode);
    let start = Instant::now();
    let mut enumerator = graph.end_components(graph.all_nodes(), mode);
    let mut components = Vec::new();
    for component in enumerator.by_ref() {
        println!("{} #{}: {:?}", mode, components.len(), component.to_vec());
        components.push(component);
    }
    println!("Found {} components in {:?}", components.len(), start.elapsed());
    println!("stats = {:?}", enumerator.stats());

    // Nodes from which some scheduler reaches a component almost surely.
    let mut covered = BitSet::new(graph.num_nodes());
    for component in &components {
        covered.union_with(component);
    }
    let attractor = graph.reach_pre_all(&covered, Scheduler::Max, Objective::AlmostSure);
    println!(
        "{} of {} nodes reach a component almost surely",
        attractor.len(),
        graph.num_nodes()
    );

    if let Some(path) = &args.dot {
        std::fs::write(path, graph.to_dot(&components)?)?;
        println!("DOT written to {}", path.display());
    }

    Ok(())
}
