//! # referral_network - Hierarchical Referral Network Engine
//!
//! Data engine behind a multi-level referral ("network-marketing") organization
//! viewer. It generates a synthetic forest of agents, rolls earnings and headcount
//! up each downline, and answers the navigational queries of the two
//! presentations: the galaxy (force graph) and the explorer (collapsible table).
//!
//! ## Core Components
//!
//! - **nw_generator**: Seeded synthetic forest generation
//! - **nw_aggregator**: Bottom-up rollups and parent links
//! - **nw_snapshot**: Immutable, indexed, shareable aggregated forest
//! - **nw_query**: Stateless lookups, filtering and breadcrumb paths
//! - **nw_galaxy**: Flattened graph view with highlight/search flags
//! - **nw_store**: Cached snapshot plus per-session navigation state
//!
//! ## Usage
//!
//! ```no_run
//! use referral_network::{NetworkStore, StoreConfig};
//!
//! let mut store = NetworkStore::new(StoreConfig::default());
//!
//! // generated on first access, cached afterwards
//! let snapshot = store.full_forest().unwrap();
//! snapshot.summary().print_summary();
//!
//! let leader = snapshot.roots()[0].id;
//! store.set_focus(Some(leader)).unwrap();
//! store.set_search_term("petrov");
//!
//! let view = store.explorer_view().unwrap();
//! for row in view.rows(&store.navigation().expanded_ids) {
//!     println!("{}{}", "  ".repeat(row.depth), row.node.name);
//! }
//! ```
//!
//! ## Scenarios
//!
//! `simulator/scenario_runner.rs` drives a store from YAML navigation scripts in
//! `scenarios/`; see that file for the format.

pub mod nw_interface;

// Generation and aggregation
pub mod nw_generator;
pub mod nw_identity;
pub mod nw_insights;
pub mod nw_aggregator;

// Read side
pub mod nw_snapshot;
pub mod nw_query;
pub mod nw_galaxy;

pub mod nw_store;

pub use nw_aggregator::StructuralError;
pub use nw_generator::{ConfigError, GeneratorConfig};
pub use nw_interface::{AgentId, AgentNode, Breadcrumb, ViewMode};
pub use nw_snapshot::{NetworkSnapshot, NetworkSummary};
pub use nw_store::{NavigationState, NetworkError, NetworkStore, StoreConfig};
