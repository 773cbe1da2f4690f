//! Stateless queries over an aggregated forest.
//!
//! Every traversal here runs on an explicit stack or queue; none of them
//! recurses, so the depth of the network never limits them.

use std::borrow::Cow;
use std::collections::VecDeque;

use indexmap::IndexSet;
use log::warn;

use crate::nw_interface::{AgentId, AgentLookup, AgentNode, Breadcrumb};

/// Depth-first (pre-order) search for an agent; stops at the first match
pub fn find_by_id(forest: &[AgentNode], id: AgentId) -> Option<&AgentNode> {
    let mut stack: Vec<&AgentNode> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.id == id {
            return Some(node);
        }
        stack.extend(node.children.iter().rev());
    }
    None
}

/// Number of agents in the forest, roots included
pub fn count_nodes(forest: &[AgentNode]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&AgentNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.children.iter());
    }
    count
}

/// Breadth-first ids of `node` and its descendants down to `max_depth` levels
/// below it.
///
/// The result keeps visiting order. A visited set guards the walk so it stays
/// finite even if the structure is ever reused for something that is not a tree.
pub fn bounded_descendants(node: &AgentNode, max_depth: usize) -> IndexSet<AgentId> {
    let mut visited = IndexSet::new();
    let mut queue: VecDeque<(&AgentNode, usize)> = VecDeque::new();
    queue.push_back((node, 0));

    while let Some((current, depth)) = queue.pop_front() {
        if !visited.insert(current.id) {
            continue;
        }
        if depth < max_depth {
            for child in &current.children {
                queue.push_back((child, depth + 1));
            }
        }
    }

    visited
}

struct FilterFrame<'a> {
    node: &'a AgentNode,
    next_child: usize,
    kept: Vec<AgentNode>,
}

impl<'a> FilterFrame<'a> {
    fn new(node: &'a AgentNode) -> Self {
        Self {
            node,
            next_child: 0,
            kept: Vec::new(),
        }
    }
}

/// Ancestor-preserving search filter.
///
/// A blank term returns the input untouched (`Cow::Borrowed`). Otherwise the
/// forest is rebuilt post-order: an agent is kept when its name or email
/// contains the term (case-insensitive) or when any of its children was kept.
/// Kept agents are shallow copies with only `children` replaced; rollups still
/// describe the full, unfiltered downline.
pub fn filtered_view<'a>(forest: &'a [AgentNode], search_term: &str) -> Cow<'a, [AgentNode]> {
    if search_term.trim().is_empty() {
        return Cow::Borrowed(forest);
    }

    let needle = search_term.to_lowercase();
    let mut result = Vec::new();
    let mut stack: Vec<FilterFrame<'a>> = Vec::new();

    for root in forest {
        stack.push(FilterFrame::new(root));

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            if let Some(child) = node.children.get(frame.next_child) {
                frame.next_child += 1;
                stack.push(FilterFrame::new(child));
                continue;
            }

            let Some(FilterFrame { node, kept, .. }) = stack.pop() else {
                break;
            };
            if kept.is_empty() && !node.matches_lowercase(&needle) {
                continue;
            }

            let mut copy = node.detached();
            copy.children = kept;
            match stack.last_mut() {
                Some(parent) => parent.kept.push(copy),
                None => result.push(copy),
            }
        }
    }

    Cow::Owned(result)
}

/// Root-to-focus trail for the focused agent.
///
/// Walks `parent_id` links upward. The walk is capped at the number of agents
/// in the lookup, so a corrupted parent chain cannot loop forever. An absent or
/// unknown focus yields an empty trail.
pub fn breadcrumb_path<L: AgentLookup + ?Sized>(
    lookup: &L,
    focused: Option<AgentId>,
) -> Vec<Breadcrumb> {
    let Some(mut current) = focused else {
        return Vec::new();
    };

    let limit = lookup.node_count();
    let mut path = Vec::new();

    while let Some(node) = lookup.agent(current) {
        if path.len() == limit {
            warn!(
                "breadcrumb walk from agent {:?} exceeded {} steps, parent chain is corrupted",
                focused, limit
            );
            break;
        }
        path.push(Breadcrumb::from(node));
        match node.parent_id {
            Some(parent) => current = parent,
            None => break,
        }
    }

    path.reverse();
    path
}

/// A line of the explorer table
#[derive(Debug, Clone, Copy)]
pub struct ExplorerRow<'a> {
    pub node: &'a AgentNode,
    pub depth: usize,
    pub expanded: bool,
}

/// Flatten the forest into table rows, pre-order.
///
/// Children are listed only below agents whose id is in `expanded`; leaves are
/// never reported as expanded.
pub fn visible_rows<'a>(forest: &'a [AgentNode], expanded: &IndexSet<AgentId>) -> Vec<ExplorerRow<'a>> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&AgentNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let is_expanded = !node.is_leaf() && expanded.contains(&node.id);
        rows.push(ExplorerRow {
            node,
            depth,
            expanded: is_expanded,
        });
        if is_expanded {
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nw_aggregator::aggregate;
    use crate::nw_interface::Identity;

    fn agent(id: AgentId, name: &str, children: Vec<AgentNode>) -> AgentNode {
        let identity = Identity {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        };
        let mut node = AgentNode::new(id, identity, 100.0, 30.0);
        node.children = children;
        node
    }

    // three roots with two children each, ids 0..9
    fn three_by_two() -> Vec<AgentNode> {
        let forest = (0..3)
            .map(|r| {
                let base = r * 3;
                agent(
                    base,
                    &format!("Root {}", r),
                    vec![
                        agent(base + 1, &format!("Child {}a", r), vec![]),
                        agent(base + 2, &format!("Child {}b", r), vec![]),
                    ],
                )
            })
            .collect();
        aggregate(forest).unwrap()
    }

    //   0 Anna Petrova
    //   ├── 1 Ivan Sidorov
    //   │   ├── 3 Olga Novikova
    //   │   │   └── 6 Maria Voronova
    //   │   └── 4 Petr Popov
    //   └── 2 Elena Smirnova
    //       └── 5 Nikita Lebedev
    //   7 Sergei Kuznetsov
    fn org_chart() -> Vec<AgentNode> {
        let forest = vec![
            agent(
                0,
                "Anna Petrova",
                vec![
                    agent(
                        1,
                        "Ivan Sidorov",
                        vec![
                            agent(3, "Olga Novikova", vec![agent(6, "Maria Voronova", vec![])]),
                            agent(4, "Petr Popov", vec![]),
                        ],
                    ),
                    agent(2, "Elena Smirnova", vec![agent(5, "Nikita Lebedev", vec![])]),
                ],
            ),
            agent(7, "Sergei Kuznetsov", vec![]),
        ];
        aggregate(forest).unwrap()
    }

    fn ids(forest: &[AgentNode]) -> Vec<AgentId> {
        let mut out = Vec::new();
        let mut stack: Vec<&AgentNode> = forest.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node.id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    #[test]
    fn test_find_every_node_in_sibling_roots() {
        let forest = three_by_two();

        for id in 0..9 {
            let found = find_by_id(&forest, id).expect("node should be found");
            assert_eq!(found.id, id);
        }
        assert!(find_by_id(&forest, 9).is_none());
        assert!(find_by_id(&[], 0).is_none());
    }

    #[test]
    fn test_find_returns_first_preorder_match() {
        // two unaggregated agents sharing an id: the earlier branch wins
        let mut forest = vec![
            agent(0, "First", vec![agent(5, "Deep", vec![])]),
            agent(5, "Later", vec![]),
        ];
        assert_eq!(find_by_id(&forest, 5).unwrap().name, "Deep");

        forest.swap(0, 1);
        assert_eq!(find_by_id(&forest, 5).unwrap().name, "Later");
    }

    #[test]
    fn test_count_nodes() {
        assert_eq!(count_nodes(&three_by_two()), 9);
        assert_eq!(count_nodes(&org_chart()), 8);
        assert_eq!(count_nodes(&[]), 0);
    }

    #[test]
    fn test_bounded_descendants_depth_zero_and_one() {
        let forest = org_chart();
        let root = &forest[0];

        let zero = bounded_descendants(root, 0);
        assert_eq!(zero.into_iter().collect::<Vec<_>>(), vec![0]);

        let one = bounded_descendants(root, 1);
        assert_eq!(one.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_bounded_descendants_breadth_first_order() {
        let forest = org_chart();

        let two = bounded_descendants(&forest[0], 2);
        assert_eq!(two.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);

        let all = bounded_descendants(&forest[0], 10);
        assert_eq!(all.len(), 1 + forest[0].total_in_network);
        assert!(!all.contains(&7));
    }

    #[test]
    fn test_blank_filter_borrows_input() {
        let forest = org_chart();

        for term in ["", "   ", "\t"] {
            let view = filtered_view(&forest, term);
            assert!(matches!(view, Cow::Borrowed(_)));
            assert!(std::ptr::eq(view.as_ref(), forest.as_slice()));
            assert_eq!(ids(&view), ids(&forest));
        }
    }

    #[test]
    fn test_filter_preserves_ancestors() {
        let forest = org_chart();
        let view = filtered_view(&forest, "voronova");

        // leaf 6 matches; its whole ancestry stays even though none of it matches
        assert_eq!(ids(&view), vec![0, 1, 3, 6]);

        // rollups still describe the unfiltered downline
        assert_eq!(view[0].total_in_network, 6);
        assert_eq!(view[0].children.len(), 1);
        assert_eq!(view[0].children[0].direct_referrals, 2);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_matches_email() {
        let forest = org_chart();

        let by_name = filtered_view(&forest, "ELENA");
        assert_eq!(ids(&by_name), vec![0, 2]);

        let by_email = filtered_view(&forest, "nikita.lebedev@");
        assert_eq!(ids(&by_email), vec![0, 2, 5]);
    }

    #[test]
    fn test_filter_drops_unmatched_subtrees() {
        let forest = org_chart();
        let view = filtered_view(&forest, "ro");

        // "ro" hits Petrova, Sidorov and Voronova only
        let kept = ids(&view);
        assert_eq!(kept, vec![0, 1, 3, 6]);
        for dropped in [2, 4, 5, 7] {
            assert!(!kept.contains(&dropped));
        }

        for id in &kept {
            let node = find_by_id(&view, *id).unwrap();
            let has_matching_descendant = !node.children.is_empty();
            assert!(node.matches_lowercase("ro") || has_matching_descendant);
        }
    }

    #[test]
    fn test_filter_keeps_sibling_order() {
        let forest = three_by_two();
        let view = filtered_view(&forest, "child");

        assert_eq!(ids(&view), vec![0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(matches!(view, Cow::Owned(_)));
    }

    #[test]
    fn test_filter_without_matches_is_empty() {
        let forest = org_chart();
        assert!(filtered_view(&forest, "zzz").is_empty());
    }

    #[test]
    fn test_breadcrumbs_from_root_and_leaf() {
        let forest = org_chart();

        let root_only = breadcrumb_path(forest.as_slice(), Some(0));
        assert_eq!(
            root_only,
            vec![Breadcrumb {
                id: 0,
                name: "Anna Petrova".to_string()
            }]
        );

        let trail: Vec<AgentId> = breadcrumb_path(forest.as_slice(), Some(6))
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(trail, vec![0, 1, 3, 6]);
    }

    #[test]
    fn test_breadcrumbs_without_focus_or_unknown_focus() {
        let forest = org_chart();

        assert!(breadcrumb_path(forest.as_slice(), None).is_empty());
        assert!(breadcrumb_path(forest.as_slice(), Some(42)).is_empty());
    }

    #[test]
    fn test_breadcrumbs_terminate_on_corrupted_parents() {
        // two roots pointing at each other
        let mut a = agent(1, "A", vec![]);
        let mut b = agent(2, "B", vec![]);
        a.parent_id = Some(2);
        b.parent_id = Some(1);
        let forest = vec![a, b];

        let trail = breadcrumb_path(forest.as_slice(), Some(1));
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let forest = org_chart();

        let collapsed = visible_rows(&forest, &IndexSet::new());
        let top: Vec<AgentId> = collapsed.iter().map(|r| r.node.id).collect();
        assert_eq!(top, vec![0, 7]);
        assert!(collapsed.iter().all(|r| r.depth == 0 && !r.expanded));

        let expanded: IndexSet<AgentId> = [0, 1, 5, 7].into_iter().collect();
        let rows = visible_rows(&forest, &expanded);
        let shown: Vec<(AgentId, usize)> = rows.iter().map(|r| (r.node.id, r.depth)).collect();
        assert_eq!(shown, vec![(0, 0), (1, 1), (3, 2), (4, 2), (2, 1), (7, 0)]);

        // leaves are never expanded, even if listed
        assert!(!rows.iter().find(|r| r.node.id == 7).unwrap().expanded);
    }
}
