// Bottom-up rollup of the referral forest
//
// One post-order pass annotates every agent with its direct referral count, the
// size of its whole downline and the summed earnings of that downline, and links
// each child back to its parent. The pass runs on an explicit stack and takes
// the forest by value, so no intermediate copies of subtrees are made.

use hashbrown::HashSet;
use log::debug;
use thiserror::Error;

use crate::nw_interface::{AgentId, AgentNode};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    /// The same id was reached twice (shared subtree or id collision)
    #[error("agent {0} appears more than once in the forest")]
    DuplicateAgent(AgentId),

    #[error("agent {id} has invalid earnings {earnings}")]
    InvalidEarnings { id: AgentId, earnings: f64 },
}

struct Frame {
    node: AgentNode,
    pending: std::vec::IntoIter<AgentNode>,
    done: Vec<AgentNode>,
}

fn open(mut node: AgentNode, visited: &mut HashSet<AgentId>) -> Result<Frame, StructuralError> {
    if !visited.insert(node.id) {
        return Err(StructuralError::DuplicateAgent(node.id));
    }
    if !node.earnings.is_finite() || node.earnings < 0.0 {
        return Err(StructuralError::InvalidEarnings {
            id: node.id,
            earnings: node.earnings,
        });
    }

    let children = std::mem::take(&mut node.children);
    Ok(Frame {
        node,
        done: Vec::with_capacity(children.len()),
        pending: children.into_iter(),
    })
}

// all children of the frame are finished at this point
fn close(frame: Frame) -> AgentNode {
    let Frame {
        mut node,
        mut done,
        ..
    } = frame;

    let mut total_in_network = 0;
    let mut network_earnings = 0.0;
    for child in done.iter_mut() {
        child.parent_id = Some(node.id);
        total_in_network += 1 + child.total_in_network;
        network_earnings += child.earnings + child.network_earnings;
    }

    node.direct_referrals = done.len();
    node.total_in_network = total_in_network;
    node.network_earnings = network_earnings;
    node.children = done;
    node
}

/// Annotate a forest with rollups and parent links
///
/// Derived values are recomputed from scratch, so aggregating an already
/// aggregated forest yields the same values. Roots always end up with
/// `parent_id == None`.
///
/// # Errors
/// * [`StructuralError::DuplicateAgent`] if an id is reached twice
/// * [`StructuralError::InvalidEarnings`] for negative or non-finite earnings
///
/// Either error aborts the whole call; no partially aggregated forest escapes.
pub fn aggregate(forest: Vec<AgentNode>) -> Result<Vec<AgentNode>, StructuralError> {
    let mut visited: HashSet<AgentId> = HashSet::new();
    let mut aggregated = Vec::with_capacity(forest.len());
    let mut stack: Vec<Frame> = Vec::new();

    for root in forest {
        stack.push(open(root, &mut visited)?);

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.pending.next() {
                let child_frame = open(child, &mut visited)?;
                stack.push(child_frame);
                continue;
            }

            let Some(finished) = stack.pop() else { break };
            let node = close(finished);
            match stack.last_mut() {
                Some(parent) => parent.done.push(node),
                None => {
                    let mut root = node;
                    root.parent_id = None;
                    aggregated.push(root);
                }
            }
        }
    }

    debug!(
        "Aggregated {} agents across {} roots",
        visited.len(),
        aggregated.len()
    );

    Ok(aggregated)
}
