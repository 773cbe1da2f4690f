// Demo driver: builds the production-sized network and walks it the way the
// viewer would (focus a leader, search, expand, inspect, highlight).

use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use referral_network::nw_interface::ViewMode;
use referral_network::{NetworkError, NetworkStore, StoreConfig};

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    info!("starting");

    let mut store = NetworkStore::new(StoreConfig::default());

    let snapshot = or_exit(store.full_forest(), "Failed to build network");

    if let Some(seed) = store.seed_used() {
        info!("seed: {}", hex(&seed));
    }
    snapshot.summary().print_summary();

    // biggest leader
    let Some(leader) = snapshot.roots().iter().max_by_key(|r| r.total_in_network) else {
        eprintln!("Network has no leaders");
        std::process::exit(1);
    };

    or_exit(store.set_focus(Some(leader.id)), "Focus failed");

    println!("\nExplorer focused on {} ({} agents in network):", leader.name, leader.total_in_network);
    let view = or_exit(store.explorer_view(), "Explorer view failed");
    for row in view.rows(&store.navigation().expanded_ids) {
        println!(
            "  {}{} {:<24} direct {:>3}  network {:>5}  earnings {:>10.2}",
            "  ".repeat(row.depth),
            if row.expanded { "▾" } else if row.node.is_leaf() { " " } else { "▸" },
            row.node.name,
            row.node.direct_referrals,
            row.node.total_in_network,
            row.node.earnings,
        );
    }

    // deepest agent of the focused tree for the breadcrumb trail
    let mut deepest = leader;
    let mut stack = vec![leader];
    while let Some(node) = stack.pop() {
        if snapshot.depth_of(node.id) > snapshot.depth_of(deepest.id) {
            deepest = node;
        }
        stack.extend(node.children.iter());
    }

    or_exit(store.set_focus(Some(deepest.id)), "Focus failed");
    let trail: Vec<String> = store.breadcrumbs().into_iter().map(|b| b.name).collect();
    println!("\nDeepest agent: {}", trail.join(" › "));

    or_exit(store.select_agent(deepest.id), "Selection failed");
    if let Some(agent) = store.selected_agent() {
        println!("\nInspector: {} <{}>", agent.name, agent.email);
        println!("  Earnings: {:.2} (last 30 days {:.2})", agent.earnings, agent.earnings_30d);
        let history: Vec<String> = agent.earnings_history.iter().map(|v| format!("{:.0}", v)).collect();
        println!("  Monthly history: [{}]", history.join(", "));
        for entry in &agent.activity_log {
            println!(
                "  {:>2} days ago  {:<18} {:>8.2}",
                entry.days_ago,
                entry.kind.description(),
                entry.amount
            );
        }
    }
    store.close_inspector();

    store.set_search_term("ivan");
    or_exit(store.set_focus(None), "Focus failed");
    let filtered = or_exit(store.explorer_view(), "Explorer view failed").roots().len();
    println!("\nSearch \"ivan\": {} of {} leaders keep a match", filtered, snapshot.roots().len());

    or_exit(store.highlight_subtree(leader.id), "Highlight failed");
    store.set_mode(ViewMode::Galaxy);
    match store.galaxy_view() {
        Ok(graph) => println!(
            "Galaxy: {} nodes, {} edges, {} highlighted, {} matching \"ivan\"",
            graph.nodes.len(),
            graph.edges.len(),
            graph.highlighted_count(),
            graph.visible_count()
        ),
        Err(e) => eprintln!("Galaxy view failed: {}", e),
    }

    info!("done");
}

fn or_exit<T>(result: Result<T, NetworkError>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("{}: {}", what, e);
        std::process::exit(1);
    })
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
