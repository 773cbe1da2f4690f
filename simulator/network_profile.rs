// Network Profile - timing of generation, aggregation and queries
//
// Usage:
//   cargo run --example network_profile --release
//   cargo run --example network_profile --release -- config.yaml 5

use std::env;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::SeedableRng;

use referral_network::nw_aggregator::aggregate;
use referral_network::nw_galaxy::GalaxyGraph;
use referral_network::nw_generator::generate_forest;
use referral_network::nw_identity::RosterIdentities;
use referral_network::nw_interface::{AgentId, HIGHLIGHT_DEPTH};
use referral_network::nw_query::{bounded_descendants, breadcrumb_path, filtered_view, find_by_id};
use referral_network::{NetworkSnapshot, StoreConfig};

fn main() {
    let args: Vec<String> = env::args().collect();

    let config: StoreConfig = match args.get(1) {
        Some(path) => {
            let path = Path::new(path);
            let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Failed to read {}: {}", path.display(), e);
                std::process::exit(1);
            });
            serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
                eprintln!("Failed to parse {}: {}", path.display(), e);
                std::process::exit(1);
            })
        }
        None => StoreConfig::default(),
    };
    let runs: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(3);

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  NETWORK PROFILE                                       ║");
    println!("╚════════════════════════════════════════════════════════╝\n");
    println!("Config: {:?}", config.generator);
    println!("Runs: {}\n", runs);

    let mut generate_time = Duration::ZERO;
    let mut aggregate_time = Duration::ZERO;
    let mut index_time = Duration::ZERO;
    let mut query_time = Duration::ZERO;
    let mut agents = 0;

    for run in 0..runs {
        let seed = config.resolve_seed();
        let mut rng = StdRng::from_seed(seed);

        // Time: generation
        let start = Instant::now();
        let forest = generate_forest(&config.generator, &mut rng, &mut RosterIdentities::new())
            .unwrap_or_else(|e| {
                eprintln!("Invalid configuration: {}", e);
                std::process::exit(1);
            });
        generate_time += start.elapsed();

        // Time: aggregation alone
        let start = Instant::now();
        let aggregated = aggregate(forest.clone()).unwrap_or_else(|e| {
            eprintln!("Aggregation failed: {}", e);
            std::process::exit(1);
        });
        aggregate_time += start.elapsed();
        drop(aggregated);

        // Time: aggregation plus index
        let start = Instant::now();
        let snapshot = NetworkSnapshot::build(forest).unwrap_or_else(|e| {
            eprintln!("Snapshot failed: {}", e);
            std::process::exit(1);
        });
        index_time += start.elapsed();

        agents = snapshot.node_count();
        let last: AgentId = agents.saturating_sub(1) as AgentId;

        // Time: one round of viewer queries
        let start = Instant::now();
        let linear = find_by_id(snapshot.roots(), last).map(|n| n.id);
        let indexed = snapshot.agent(last).map(|n| n.id);
        assert_eq!(linear, indexed);
        let crumbs = breadcrumb_path(&snapshot, Some(last));
        let filtered = filtered_view(snapshot.roots(), "ivan");
        let highlighted: IndexSet<AgentId> = snapshot
            .roots()
            .first()
            .map(|root| bounded_descendants(root, HIGHLIGHT_DEPTH))
            .unwrap_or_default();
        let graph = GalaxyGraph::build(snapshot.roots(), &highlighted, "ivan");
        query_time += start.elapsed();

        println!(
            "  ✓ run {}: {} agents, breadcrumb depth {}, {} leaders match, {} highlighted, {} visible",
            run + 1,
            agents,
            crumbs.len(),
            filtered.len(),
            graph.highlighted_count(),
            graph.visible_count()
        );
    }

    let runs_u32 = runs.max(1) as u32;
    println!("\nAverages over {} run(s) ({} agents in last run):", runs, agents);
    println!("  Generation:          {:?}", generate_time / runs_u32);
    println!("  Aggregation:         {:?}", aggregate_time / runs_u32);
    println!("  Aggregation + index: {:?}", index_time / runs_u32);
    println!("  Queries:             {:?}", query_time / runs_u32);
}
