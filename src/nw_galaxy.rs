// Flattened node/edge view of the whole network for the galaxy (force graph) mode
//
// Search in this mode only hides agents whose *name* lacks the term; unlike the
// explorer filter it does not keep ancestors of matches visible.

use indexmap::IndexSet;
use serde::Serialize;

use crate::nw_interface::{AgentId, AgentNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: AgentId,
    pub depth: usize,
    pub name: String,
    pub earnings: f64,
    pub network_earnings: f64,
    pub highlighted: bool,
    // something else is highlighted
    pub dimmed: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: AgentId,
    pub target: AgentId,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GalaxyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GalaxyGraph {
    /// Nodes in pre-order, one edge per parent/child pair
    pub fn build(forest: &[AgentNode], highlighted: &IndexSet<AgentId>, search_term: &str) -> Self {
        let highlight_active = !highlighted.is_empty();
        let needle = if search_term.trim().is_empty() {
            None
        } else {
            Some(search_term.to_lowercase())
        };

        let mut graph = GalaxyGraph::default();
        let mut stack: Vec<(&AgentNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            let is_highlighted = highlighted.contains(&node.id);
            let hidden = match &needle {
                Some(needle) => !node.name.to_lowercase().contains(needle.as_str()),
                None => false,
            };

            graph.nodes.push(GraphNode {
                id: node.id,
                depth,
                name: node.name.clone(),
                earnings: node.earnings,
                network_earnings: node.network_earnings,
                highlighted: is_highlighted,
                dimmed: highlight_active && !is_highlighted,
                hidden,
            });

            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
            graph.edges.extend(node.children.iter().map(|child| GraphEdge {
                source: node.id,
                target: child.id,
            }));
        }

        graph
    }

    pub fn visible_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.hidden).count()
    }

    pub fn highlighted_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.highlighted).count()
    }
}
