//! Immutable aggregated network
//!
//! A `NetworkSnapshot` is what the store caches and hands out behind an `Arc`.
//! Besides the aggregated forest it keeps an id index (the child-index path
//! from a root down to every agent), which turns id lookups into a walk of at
//! most `depth` steps instead of a scan of the whole forest.

use hashbrown::HashMap;

use crate::nw_aggregator::{aggregate, StructuralError};
use crate::nw_interface::{AgentId, AgentLookup, AgentNode};

pub struct NetworkSnapshot {
    roots: Vec<AgentNode>,
    index: HashMap<AgentId, Vec<usize>>,
}

/// Headline numbers of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSummary {
    pub roots: usize,
    pub agents: usize,
    pub leaves: usize,
    /// Deepest populated level (roots are level 0)
    pub deepest_level: usize,
    pub total_earnings: f64,
    pub total_earnings_30d: f64,
    /// Root with the largest downline: (id, name, total_in_network)
    pub top_leader: Option<(AgentId, String, usize)>,
}

impl NetworkSummary {
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        Referral Network Summary                       ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Structure:");
        println!("  Leaders (roots): {}", self.roots);
        println!("  Agents: {}", self.agents);
        println!("  Leaves: {}", self.leaves);
        println!("  Deepest level: {}", self.deepest_level);
        println!();

        println!("Earnings:");
        println!("  Lifetime: {:.2}", self.total_earnings);
        println!("  Last 30 days: {:.2}", self.total_earnings_30d);
        println!();

        if let Some((id, name, size)) = &self.top_leader {
            println!("Largest downline: {} (agent {}) with {} agents", name, id, size);
        }
    }
}

impl NetworkSnapshot {
    /// Aggregate a raw forest and index it
    pub fn build(forest: Vec<AgentNode>) -> Result<Self, StructuralError> {
        let roots = aggregate(forest)?;
        Ok(Self::index(roots))
    }

    fn index(roots: Vec<AgentNode>) -> Self {
        let mut index = HashMap::new();
        let mut stack: Vec<(&AgentNode, Vec<usize>)> = roots
            .iter()
            .enumerate()
            .map(|(i, root)| (root, vec![i]))
            .collect();

        while let Some((node, path)) = stack.pop() {
            for (i, child) in node.children.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child, child_path));
            }
            index.insert(node.id, path);
        }

        Self { roots, index }
    }

    pub fn roots(&self) -> &[AgentNode] {
        &self.roots
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentNode> {
        let (first, rest) = self.index.get(&id)?.split_first()?;
        let mut node = self.roots.get(*first)?;
        for i in rest {
            node = node.children.get(*i)?;
        }
        Some(node)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Level of an agent below its root (roots are level 0)
    pub fn depth_of(&self, id: AgentId) -> Option<usize> {
        self.index.get(&id).map(|path| path.len() - 1)
    }

    pub fn summary(&self) -> NetworkSummary {
        let mut leaves = 0;
        let mut total_earnings = 0.0;
        let mut total_earnings_30d = 0.0;

        let mut stack: Vec<&AgentNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                leaves += 1;
            }
            total_earnings += node.earnings;
            total_earnings_30d += node.earnings_30d;
            stack.extend(node.children.iter());
        }

        let deepest_level = self
            .index
            .values()
            .map(|path| path.len() - 1)
            .max()
            .unwrap_or(0);

        // first root wins ties
        let top_leader = self
            .roots
            .iter()
            .fold(None::<&AgentNode>, |best, root| match best {
                Some(b) if b.total_in_network >= root.total_in_network => Some(b),
                _ => Some(root),
            })
            .map(|root| (root.id, root.name.clone(), root.total_in_network));

        NetworkSummary {
            roots: self.roots.len(),
            agents: self.node_count(),
            leaves,
            deepest_level,
            total_earnings,
            total_earnings_30d,
            top_leader,
        }
    }
}

impl AgentLookup for NetworkSnapshot {
    fn agent(&self, id: AgentId) -> Option<&AgentNode> {
        NetworkSnapshot::agent(self, id)
    }

    fn node_count(&self) -> usize {
        NetworkSnapshot::node_count(self)
    }
}
