//! Network Store
//!
//! Owns the cached [`NetworkSnapshot`] and the session's [`NavigationState`].
//! The snapshot is generated lazily on first access and then served as a shared
//! `Arc` until [`NetworkStore::regenerate`] or [`NetworkStore::invalidate`].
//! Navigation never touches the snapshot; it only parameterizes the views.
//!
//! Mutators that name an agent return `Ok(false)` and leave the state unchanged
//! when the id is unknown. `Err` is reserved for failures of the lazy
//! generation behind them.

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::IndexSet;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nw_aggregator::StructuralError;
use crate::nw_galaxy::GalaxyGraph;
use crate::nw_generator::{generate_forest, ConfigError, GeneratorConfig};
use crate::nw_identity::RosterIdentities;
use crate::nw_interface::{
    AgentId, AgentNode, Breadcrumb, IdentitySource, ViewMode, HIGHLIGHT_DEPTH,
};
use crate::nw_query::{bounded_descendants, breadcrumb_path, filtered_view, visible_rows, ExplorerRow};
use crate::nw_snapshot::NetworkSnapshot;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("invalid generator configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed network: {0}")]
    Structural(#[from] StructuralError),
}

/// Configuration of a store
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub generator: GeneratorConfig,

    /// Random seed (None = fresh entropy for every generation)
    pub seed: Option<[u8; 32]>,
}

impl StoreConfig {
    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        self.seed.unwrap_or_else(|| {
            let mut temp_rng = StdRng::from_entropy();
            let mut seed = [0u8; 32];
            temp_rng.fill_bytes(&mut seed);
            seed
        })
    }
}

/// Session-scoped navigation parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NavigationState {
    pub focused_root_id: Option<AgentId>,
    pub search_term: String,
    pub expanded_ids: IndexSet<AgentId>,
    pub highlighted_ids: IndexSet<AgentId>,
    /// Agent shown in the inspector panel
    pub selected_id: Option<AgentId>,
    pub mode: ViewMode,
}

/// Focused and filtered forest as shown by the explorer table
pub struct ExplorerView {
    snapshot: Arc<NetworkSnapshot>,
    focus: Option<AgentId>,
    // None when the search term is blank; the snapshot is then shown as is
    filtered: Option<Vec<AgentNode>>,
}

impl ExplorerView {
    pub fn roots(&self) -> &[AgentNode] {
        if let Some(filtered) = &self.filtered {
            return filtered;
        }
        match self.focus.and_then(|id| self.snapshot.agent(id)) {
            Some(node) => std::slice::from_ref(node),
            None => self.snapshot.roots(),
        }
    }

    pub fn rows<'a>(&'a self, expanded: &IndexSet<AgentId>) -> Vec<ExplorerRow<'a>> {
        visible_rows(self.roots(), expanded)
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered.is_some()
    }
}

// roots that have something to unfold
fn first_level(roots: &[AgentNode]) -> IndexSet<AgentId> {
    roots
        .iter()
        .filter(|node| !node.is_leaf())
        .map(|node| node.id)
        .collect()
}

pub struct NetworkStore {
    config: StoreConfig,
    identities: Box<dyn IdentitySource + Send>,
    cache: Option<Arc<NetworkSnapshot>>,
    seed_used: Option<[u8; 32]>,
    navigation: NavigationState,
}

impl NetworkStore {
    /// Create a store with the default roster identities. Nothing is generated
    /// until the forest is first needed.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_identities(config, Box::new(RosterIdentities::new()))
    }

    pub fn with_identities(config: StoreConfig, identities: Box<dyn IdentitySource + Send>) -> Self {
        Self {
            config,
            identities,
            cache: None,
            seed_used: None,
            navigation: NavigationState::default(),
        }
    }

    /// Create a store serving a caller-supplied raw forest
    pub fn from_forest(forest: Vec<AgentNode>) -> Result<Self, NetworkError> {
        Self::from_forest_with_config(forest, StoreConfig::default())
    }

    /// Like [`NetworkStore::from_forest`], with `config` governing any later
    /// regeneration
    pub fn from_forest_with_config(
        forest: Vec<AgentNode>,
        config: StoreConfig,
    ) -> Result<Self, NetworkError> {
        let snapshot = NetworkSnapshot::build(forest)?;
        let mut store = Self::new(config);
        store.install(Arc::new(snapshot));
        Ok(store)
    }

    /// Replace the generator configuration. Takes effect on the next
    /// generation; the cached snapshot is kept.
    pub fn set_generator_config(&mut self, generator: GeneratorConfig) {
        self.config.generator = generator;
    }

    /// Seed of the most recent generation (None for caller-supplied forests)
    pub fn seed_used(&self) -> Option<[u8; 32]> {
        self.seed_used
    }

    /// The cached snapshot, if one has been built
    pub fn cached(&self) -> Option<&Arc<NetworkSnapshot>> {
        self.cache.as_ref()
    }

    /// The canonical aggregated forest, generated on first access
    pub fn full_forest(&mut self) -> Result<Arc<NetworkSnapshot>, NetworkError> {
        match &self.cache {
            Some(snapshot) => Ok(Arc::clone(snapshot)),
            None => self.regenerate(),
        }
    }

    /// Generate, aggregate and publish a new snapshot.
    ///
    /// The cache is swapped only once the new snapshot is complete; on error the
    /// previous snapshot (if any) stays in place. Readers holding the old `Arc`
    /// keep a consistent view either way.
    pub fn regenerate(&mut self) -> Result<Arc<NetworkSnapshot>, NetworkError> {
        let seed = self.config.resolve_seed();
        let mut rng = StdRng::from_seed(seed);

        let forest = generate_forest(&self.config.generator, &mut rng, self.identities.as_mut())?;
        let snapshot = Arc::new(NetworkSnapshot::build(forest)?);

        info!(
            "Published network snapshot: {} agents in {} trees",
            snapshot.node_count(),
            snapshot.roots().len()
        );

        self.seed_used = Some(seed);
        self.install(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drop the cached snapshot; the next access generates a new one
    pub fn invalidate(&mut self) {
        debug!("Network snapshot invalidated");
        self.cache = None;
    }

    // ids of the previous snapshot mean nothing in the new one; the search term
    // is plain text and survives
    fn install(&mut self, snapshot: Arc<NetworkSnapshot>) {
        self.navigation.focused_root_id = None;
        self.navigation.selected_id = None;
        self.navigation.highlighted_ids.clear();
        self.navigation.expanded_ids = first_level(snapshot.roots());
        self.cache = Some(snapshot);
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    /// Narrow the explorer to one agent's subtree (`None` shows every tree).
    /// Expansion resets to the first level of the new visible forest.
    pub fn set_focus(&mut self, id: Option<AgentId>) -> Result<bool, NetworkError> {
        let snapshot = self.full_forest()?;

        let expanded = match id {
            Some(id) => match snapshot.agent(id) {
                Some(node) => first_level(std::slice::from_ref(node)),
                None => {
                    debug!("Focus on unknown agent {} ignored", id);
                    return Ok(false);
                }
            },
            None => first_level(snapshot.roots()),
        };

        self.navigation.focused_root_id = id;
        self.navigation.expanded_ids = expanded;
        self.navigation.mode = ViewMode::Explorer;
        Ok(true)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.navigation.search_term = term.into();
    }

    /// Highlight an agent and its downline up to [`HIGHLIGHT_DEPTH`] levels deep
    pub fn highlight_subtree(&mut self, id: AgentId) -> Result<bool, NetworkError> {
        let snapshot = self.full_forest()?;
        let Some(node) = snapshot.agent(id) else {
            debug!("Highlight of unknown agent {} ignored", id);
            return Ok(false);
        };

        self.navigation.highlighted_ids = bounded_descendants(node, HIGHLIGHT_DEPTH);
        Ok(true)
    }

    pub fn clear_highlight(&mut self) {
        self.navigation.highlighted_ids.clear();
    }

    pub fn toggle_expansion(&mut self, id: AgentId) -> Result<bool, NetworkError> {
        let snapshot = self.full_forest()?;
        if !snapshot.contains(id) {
            debug!("Expansion toggle of unknown agent {} ignored", id);
            return Ok(false);
        }

        if !self.navigation.expanded_ids.shift_remove(&id) {
            self.navigation.expanded_ids.insert(id);
        }
        Ok(true)
    }

    /// Open the inspector panel on an agent
    pub fn select_agent(&mut self, id: AgentId) -> Result<bool, NetworkError> {
        let snapshot = self.full_forest()?;
        if !snapshot.contains(id) {
            debug!("Selection of unknown agent {} ignored", id);
            return Ok(false);
        }

        self.navigation.selected_id = Some(id);
        Ok(true)
    }

    pub fn close_inspector(&mut self) {
        self.navigation.selected_id = None;
    }

    pub fn selected_agent(&self) -> Option<&AgentNode> {
        let snapshot = self.cache.as_ref()?;
        snapshot.agent(self.navigation.selected_id?)
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.navigation.mode = mode;
    }

    /// Focused subtree (or every tree) filtered by the current search term
    pub fn explorer_view(&mut self) -> Result<ExplorerView, NetworkError> {
        let snapshot = self.full_forest()?;
        let focus = self.navigation.focused_root_id;

        let filtered = {
            let base = match focus.and_then(|id| snapshot.agent(id)) {
                Some(node) => std::slice::from_ref(node),
                None => snapshot.roots(),
            };
            match filtered_view(base, &self.navigation.search_term) {
                Cow::Borrowed(_) => None,
                Cow::Owned(nodes) => Some(nodes),
            }
        };

        Ok(ExplorerView {
            snapshot,
            focus,
            filtered,
        })
    }

    /// Root-to-focus trail; empty without a focus
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        match &self.cache {
            Some(snapshot) => breadcrumb_path(snapshot.as_ref(), self.navigation.focused_root_id),
            None => Vec::new(),
        }
    }

    /// The whole network as a flat graph with highlight and search flags
    pub fn galaxy_view(&mut self) -> Result<GalaxyGraph, NetworkError> {
        let snapshot = self.full_forest()?;
        Ok(GalaxyGraph::build(
            snapshot.roots(),
            &self.navigation.highlighted_ids,
            &self.navigation.search_term,
        ))
    }
}
