// Shared types and traits of the referral network engine

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::nw_query::{count_nodes, find_by_id};

// agent ids are assigned in generation pre-order, starting at 0 for every forest
pub type AgentId = u64;

/// Depth bound used when highlighting a subtree. Deep networks would otherwise
/// light up thousands of nodes for a single hover.
pub const HIGHLIGHT_DEPTH: usize = 4;

/// Number of monthly samples in an agent's earnings history
pub const EARNINGS_HISTORY_MONTHS: usize = 12;

/// Display identity of an agent, produced by an [`IdentitySource`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Kind of payout recorded in an agent's activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    ReferralBonus,
    SalesCommission,
    MonthlyBonus,
}

impl ActivityKind {
    pub fn description(&self) -> &'static str {
        match self {
            ActivityKind::ReferralBonus => "Bonus for a new referral",
            ActivityKind::SalesCommission => "Commission on a sale",
            ActivityKind::MonthlyBonus => "Monthly bonus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub amount: f64,
    pub days_ago: u32,
}

/// A single agent of the referral network together with its downline.
///
/// The generator fills in the raw attributes (`id`, identity, earnings and
/// insights, `children`). `parent_id`, `direct_referrals`, `total_in_network`
/// and `network_earnings` stay zeroed until the forest is passed through
/// [`crate::nw_aggregator::aggregate`], which overwrites them on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentNode {
    pub id: AgentId,
    pub name: String,
    pub email: String,

    /// Own lifetime earnings
    pub earnings: f64,

    /// Trailing 30 day earnings. Not part of any rollup.
    pub earnings_30d: f64,

    #[serde(default)]
    pub earnings_history: Vec<f64>,

    #[serde(default)]
    pub activity_log: Vec<ActivityEntry>,

    #[serde(default)]
    pub children: Vec<AgentNode>,

    #[serde(default)]
    pub parent_id: Option<AgentId>,

    #[serde(default)]
    pub direct_referrals: usize,

    /// Count of all descendants, any depth
    #[serde(default)]
    pub total_in_network: usize,

    /// Sum of the earnings of all descendants (the node itself excluded)
    #[serde(default)]
    pub network_earnings: f64,
}

impl AgentNode {
    /// Create a raw (not yet aggregated) leaf
    pub fn new(id: AgentId, identity: Identity, earnings: f64, earnings_30d: f64) -> Self {
        Self {
            id,
            name: identity.name,
            email: identity.email,
            earnings,
            earnings_30d,
            earnings_history: Vec::new(),
            activity_log: Vec::new(),
            children: Vec::new(),
            parent_id: None,
            direct_referrals: 0,
            total_in_network: 0,
            network_earnings: 0.0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Shallow copy: every field except `children`, which is left empty
    pub fn detached(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            earnings: self.earnings,
            earnings_30d: self.earnings_30d,
            earnings_history: self.earnings_history.clone(),
            activity_log: self.activity_log.clone(),
            children: Vec::new(),
            parent_id: self.parent_id,
            direct_referrals: self.direct_referrals,
            total_in_network: self.total_in_network,
            network_earnings: self.network_earnings,
        }
    }

    /// Case-insensitive containment of an already lowercased needle in the
    /// name or email
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }
}

/// One step of a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub id: AgentId,
    pub name: String,
}

impl From<&AgentNode> for Breadcrumb {
    fn from(node: &AgentNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
        }
    }
}

/// Which presentation the session is currently looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    Galaxy,
    #[default]
    Explorer,
}

/// Collaborator producing display identities for generated agents
pub trait IdentitySource {
    fn next_identity(&mut self, rng: &mut dyn RngCore) -> Identity;
}

/// Lookup of aggregated agents by id.
///
/// Implemented for plain forests (linear depth-first search) and for
/// [`crate::nw_snapshot::NetworkSnapshot`] (indexed).
pub trait AgentLookup {
    fn agent(&self, id: AgentId) -> Option<&AgentNode>;

    /// Total number of agents reachable through this lookup
    fn node_count(&self) -> usize;
}

impl AgentLookup for [AgentNode] {
    fn agent(&self, id: AgentId) -> Option<&AgentNode> {
        find_by_id(self, id)
    }

    fn node_count(&self) -> usize {
        count_nodes(self)
    }
}
