// Scenario Runner - Load and execute navigation scenario YAML files
//
// A scenario either generates a network (`config.generator`) or supplies one
// inline (`forest`), then replays a list of navigation steps against a store and
// prints what the viewer would show after each of them.
//
// Usage:
//   cargo run --bin scenario_runner scenarios/leader_drilldown.yaml
//   cargo run --bin scenario_runner scenarios/  (runs all .yaml files in directory)
//   cargo run --bin scenario_runner scenarios/leader_drilldown.yaml --seed 0x1234...

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use referral_network::nw_interface::{AgentId, AgentNode, ViewMode};
use referral_network::{NetworkError, NetworkStore, StoreConfig};

/// Scenario file format
#[derive(Debug, serde::Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    meta: ScenarioMeta,

    #[serde(default)]
    config: StoreConfig,

    /// Raw forest to serve instead of generating one
    #[serde(default)]
    forest: Option<Vec<AgentNode>>,

    steps: Vec<Step>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ScenarioMeta {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum Step {
    Focus {
        #[serde(default)]
        id: Option<AgentId>,
    },
    /// Focus the leader with the largest downline
    FocusTopLeader,
    Search { term: String },
    Toggle { id: AgentId },
    Highlight { id: AgentId },
    ClearHighlight,
    Select { id: AgentId },
    CloseInspector,
    Mode { mode: ViewMode },
    Regenerate,
    Invalidate,

    // reporting
    Summary,
    Explorer,
    Breadcrumbs,
    Inspect,
    Galaxy,
}

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    let program = env::args().next().unwrap_or_else(|| "scenario_runner".to_string());
    let args: Vec<String> = env::args().skip(1).collect();

    let Some((target, seed_hex)) = split_args(&args) else {
        usage(&program)
    };
    let seed = seed_hex.map(parse_seed_hex);

    let scenarios = scenario_paths(&target);
    if scenarios.len() > 1 {
        println!("Found {} scenario(s) to run", scenarios.len());
    }

    for (i, scenario_path) in scenarios.iter().enumerate() {
        if scenarios.len() > 1 {
            println!("\n{}/{} Running: {}", i + 1, scenarios.len(), scenario_path.display());
        }
        run_scenario_file(scenario_path, seed);
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <scenario.yaml | directory/> [--seed SEED_HEX]", program);
    eprintln!("\nExamples:");
    eprintln!("  {} scenarios/leader_drilldown.yaml", program);
    eprintln!("  {} scenarios/", program);
    eprintln!("  {} scenarios/leader_drilldown.yaml --seed 0x123456...", program);
    std::process::exit(1);
}

// (scenario path, seed hex); --seed may come before or after the path
fn split_args(args: &[String]) -> Option<(PathBuf, Option<&str>)> {
    let flag = args.iter().position(|arg| arg == "--seed");
    let seed_hex = match flag {
        Some(i) => Some(args.get(i + 1)?.as_str()),
        None => None,
    };
    let target = args
        .iter()
        .enumerate()
        .find(|(i, _)| flag.map_or(true, |f| *i != f && *i != f + 1))
        .map(|(_, arg)| PathBuf::from(arg))?;
    Some((target, seed_hex))
}

fn is_scenario(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

// a single file, or every scenario file of a directory in name order
fn scenario_paths(target: &Path) -> Vec<PathBuf> {
    if target.is_file() {
        return vec![target.to_path_buf()];
    }

    let entries = fs::read_dir(target).unwrap_or_else(|e| {
        eprintln!("Cannot open {}: {}", target.display(), e);
        std::process::exit(1);
    });
    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| is_scenario(path))
        .collect();
    paths.sort();

    if paths.is_empty() {
        eprintln!("No scenario files in {}", target.display());
        std::process::exit(1);
    }
    paths
}

fn run_scenario_file(path: &Path, seed: Option<[u8; 32]>) {
    println!("Loading scenario from: {}", path.display());

    let yaml_content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let scenario: ScenarioFile = serde_yaml::from_str(&yaml_content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path.display(), e);
        std::process::exit(1);
    });

    let title = scenario
        .meta
        .name
        .clone()
        .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(String::from))
        .unwrap_or_default();
    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  {}{}║", title, " ".repeat(54_usize.saturating_sub(title.chars().count())));
    println!("╚════════════════════════════════════════════════════════╝\n");

    if let Some(ref desc) = scenario.meta.description {
        println!("{}\n", desc);
    }

    let mut config = scenario.config;
    if seed.is_some() {
        // command line wins over the file
        config.seed = seed;
    }

    // an inline forest is served first; the config still drives regeneration
    let store = match scenario.forest {
        Some(forest) => NetworkStore::from_forest_with_config(forest, config),
        None => Ok(NetworkStore::new(config)),
    };
    let mut store = store.unwrap_or_else(|e| {
        eprintln!("Invalid forest in {}: {}", path.display(), e);
        std::process::exit(1);
    });

    for (i, step) in scenario.steps.iter().enumerate() {
        println!("[{:>2}] {:?}", i + 1, step);
        if let Err(e) = apply_step(&mut store, step) {
            eprintln!("Step {} failed: {}", i + 1, e);
            std::process::exit(1);
        }
    }

    if let Some(seed) = store.seed_used() {
        let hex: String = seed.iter().map(|b| format!("{:02x}", b)).collect();
        println!("\nSeed used: 0x{}", hex);
    }
    info!("scenario {} complete", title);
}

fn apply_step(store: &mut NetworkStore, step: &Step) -> Result<(), NetworkError> {
    match step {
        Step::Focus { id } => report_change(store.set_focus(*id)?),
        Step::FocusTopLeader => {
            let snapshot = store.full_forest()?;
            let leader = snapshot.summary().top_leader.map(|(id, _, _)| id);
            report_change(store.set_focus(leader)?);
        }
        Step::Search { term } => store.set_search_term(term.as_str()),
        Step::Toggle { id } => report_change(store.toggle_expansion(*id)?),
        Step::Highlight { id } => report_change(store.highlight_subtree(*id)?),
        Step::ClearHighlight => store.clear_highlight(),
        Step::Select { id } => report_change(store.select_agent(*id)?),
        Step::CloseInspector => store.close_inspector(),
        Step::Mode { mode } => store.set_mode(*mode),
        Step::Regenerate => {
            store.regenerate()?;
        }
        Step::Invalidate => store.invalidate(),
        Step::Summary => store.full_forest()?.summary().print_summary(),
        Step::Explorer => {
            let view = store.explorer_view()?;
            let rows = view.rows(&store.navigation().expanded_ids);
            if rows.is_empty() {
                println!("     (no agents match)");
            }
            for row in rows {
                let marker = if row.expanded {
                    "-"
                } else if row.node.is_leaf() {
                    " "
                } else {
                    "+"
                };
                println!(
                    "     {}{} [{}] {} ({} in network, {:.2} network earnings)",
                    "  ".repeat(row.depth),
                    marker,
                    row.node.id,
                    row.node.name,
                    row.node.total_in_network,
                    row.node.network_earnings
                );
            }
        }
        Step::Breadcrumbs => {
            let trail: Vec<String> = store
                .breadcrumbs()
                .into_iter()
                .map(|b| format!("{} [{}]", b.name, b.id))
                .collect();
            println!("     All networks{}", trail.iter().map(|t| format!(" › {}", t)).collect::<String>());
        }
        Step::Inspect => match store.selected_agent() {
            Some(agent) => {
                println!("     {} <{}>", agent.name, agent.email);
                println!(
                    "     earnings {:.2}, last 30 days {:.2}, {} direct referrals",
                    agent.earnings, agent.earnings_30d, agent.direct_referrals
                );
                for entry in &agent.activity_log {
                    println!(
                        "     {:>2} days ago: {} {:.2}",
                        entry.days_ago,
                        entry.kind.description(),
                        entry.amount
                    );
                }
            }
            None => println!("     inspector closed"),
        },
        Step::Galaxy => {
            let graph = store.galaxy_view()?;
            println!(
                "     {} nodes, {} edges, {} highlighted, {} visible",
                graph.nodes.len(),
                graph.edges.len(),
                graph.highlighted_count(),
                graph.visible_count()
            );
        }
    }
    Ok(())
}

fn report_change(changed: bool) {
    if !changed {
        println!("     (unknown agent, nothing changed)");
    }
}

fn parse_seed_hex(hex: &str) -> [u8; 32] {
    let hex = hex.trim_start_matches("0x");
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).take(32).enumerate() {
        let byte_str = std::str::from_utf8(chunk).unwrap_or("00");
        seed[i] = u8::from_str_radix(byte_str, 16).unwrap_or_else(|_| {
            eprintln!("Invalid seed hex: {}", hex);
            std::process::exit(1);
        });
    }

    seed
}
