//! Synthetic Network Generation
//!
//! Produces the raw referral forest: `root_count` leaders, each with a randomly
//! grown downline. Deeper levels get fewer child slots and a lower chance for
//! each slot to be filled, which keeps the total size bounded even at depth 12.
//! Earnings shrink with depth as well.
//!
//! The generator is pure with respect to the supplied random source, so a seeded
//! `StdRng` reproduces the same forest (ids, names, earnings) every time.

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nw_insights::{activity_log, earnings_history};
use crate::nw_interface::{AgentId, AgentNode, IdentitySource};

/// Earnings range of a forest root (leader)
const ROOT_EARNINGS: (u32, u32) = (5_000, 25_000);

/// Earnings range of a downline agent, before the depth divisor
const DOWNLINE_EARNINGS: (u32, u32) = (50, 5_000);

/// Configuration for network generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of independent trees (leaders)
    pub root_count: usize,

    /// Deepest level that may hold agents (roots are level 0)
    pub max_depth: usize,

    /// Lower slot bound at level 0; shrinks by one per level
    pub min_children_per_level: usize,

    /// Upper slot bound at level 0; shrinks by one per level
    pub max_children_per_level: usize,

    /// Survival chance of a slot, divided by `depth + 1`
    pub branching_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_count: 35,
            max_depth: 12,
            min_children_per_level: 1,
            max_children_per_level: 8,
            branching_probability: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("root_count must be positive")]
    ZeroRoots,

    #[error("max_depth must be positive")]
    ZeroDepth,

    #[error("max_children_per_level must be positive")]
    ZeroMaxChildren,

    #[error("min_children_per_level ({min}) exceeds max_children_per_level ({max})")]
    ChildrenRangeInverted { min: usize, max: usize },

    #[error("branching_probability must be a positive finite number, got {0}")]
    BranchingProbability(f64),
}

impl GeneratorConfig {
    /// Reject parameters that would produce a degenerate forest
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_count == 0 {
            return Err(ConfigError::ZeroRoots);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.max_children_per_level == 0 {
            return Err(ConfigError::ZeroMaxChildren);
        }
        if self.min_children_per_level > self.max_children_per_level {
            return Err(ConfigError::ChildrenRangeInverted {
                min: self.min_children_per_level,
                max: self.max_children_per_level,
            });
        }
        if !self.branching_probability.is_finite() || self.branching_probability <= 0.0 {
            return Err(ConfigError::BranchingProbability(self.branching_probability));
        }
        Ok(())
    }

    /// Inclusive range of candidate child slots for agents living at `depth`
    ///
    /// The upper bound never drops below one so that a late lucky slot can
    /// still appear deep in the tree.
    pub fn slot_bounds(&self, depth: usize) -> (usize, usize) {
        let low = self.min_children_per_level.saturating_sub(depth);
        let high = match self.max_children_per_level.saturating_sub(depth) {
            0 => 1,
            high => high,
        };
        (low, high)
    }

    /// Probability that a candidate slot at `depth` becomes an agent
    pub fn survival_probability(&self, depth: usize) -> f64 {
        (self.branching_probability / (depth + 1) as f64).min(1.0)
    }
}

struct Frame {
    node: AgentNode,
    depth: usize,
    slots_left: usize,
}

fn child_slots<R: Rng>(config: &GeneratorConfig, parent_depth: usize, rng: &mut R) -> usize {
    let depth = parent_depth + 1;
    if depth > config.max_depth {
        return 0;
    }
    let (low, high) = config.slot_bounds(depth);
    rng.gen_range(low..=high)
}

fn new_agent<R: Rng>(
    id: AgentId,
    depth: usize,
    rng: &mut R,
    identities: &mut dyn IdentitySource,
) -> AgentNode {
    let identity = identities.next_identity(&mut *rng);

    let earnings = if depth == 0 {
        rng.gen_range(ROOT_EARNINGS.0..=ROOT_EARNINGS.1) as f64
    } else {
        rng.gen_range(DOWNLINE_EARNINGS.0..=DOWNLINE_EARNINGS.1) as f64 / (depth + 1) as f64
    };
    let earnings_30d = earnings * (0.2 + rng.gen::<f64>() * 0.3);

    let mut node = AgentNode::new(id, identity, earnings, earnings_30d);
    node.earnings_history = earnings_history(earnings, rng);
    node.activity_log = activity_log(earnings_30d);
    node
}

/// Generate a raw (unaggregated) forest
///
/// Agents receive ids in pre-order: a node is numbered before any of its
/// descendants, and ids restart at 0 for every call. Growth uses an explicit
/// work stack so very deep configurations cannot exhaust the call stack.
///
/// # Errors
/// Returns the first [`ConfigError`] found by [`GeneratorConfig::validate`];
/// nothing is generated in that case.
pub fn generate_forest<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
    identities: &mut dyn IdentitySource,
) -> Result<Vec<AgentNode>, ConfigError> {
    config.validate()?;

    let mut next_id: AgentId = 0;
    let mut forest = Vec::with_capacity(config.root_count);
    let mut stack: Vec<Frame> = Vec::with_capacity(config.max_depth + 1);

    for _ in 0..config.root_count {
        let root = new_agent(next_id, 0, rng, identities);
        next_id += 1;
        let slots_left = child_slots(config, 0, rng);
        stack.push(Frame {
            node: root,
            depth: 0,
            slots_left,
        });

        while let Some(frame) = stack.last_mut() {
            if frame.slots_left == 0 {
                let Some(done) = stack.pop() else { break };
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(done.node),
                    None => forest.push(done.node),
                }
                continue;
            }

            frame.slots_left -= 1;
            let depth = frame.depth + 1;

            if !rng.gen_bool(config.survival_probability(depth)) {
                continue;
            }

            let agent = new_agent(next_id, depth, rng, identities);
            next_id += 1;
            let slots_left = child_slots(config, depth, rng);
            stack.push(Frame {
                node: agent,
                depth,
                slots_left,
            });
        }
    }

    info!(
        "Generated network with {} agents ({} roots, max depth {})",
        next_id, config.root_count, config.max_depth
    );

    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nw_identity::RosterIdentities;
    use crate::nw_interface::EARNINGS_HISTORY_MONTHS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            root_count: 3,
            max_depth: 4,
            min_children_per_level: 2,
            max_children_per_level: 5,
            branching_probability: 0.9,
        }
    }

    fn generate(config: &GeneratorConfig, seed: u8) -> Vec<AgentNode> {
        let mut rng = StdRng::from_seed([seed; 32]);
        generate_forest(config, &mut rng, &mut RosterIdentities::new()).unwrap()
    }

    // (id, depth) in pre-order
    fn preorder(forest: &[AgentNode]) -> Vec<(AgentId, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(&AgentNode, usize)> = forest.iter().rev().map(|n| (n, 0)).collect();
        while let Some((node, depth)) = stack.pop() {
            out.push((node.id, depth));
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
        out
    }

    #[test]
    fn test_config_default() {
        let config = GeneratorConfig::default();

        assert_eq!(config.root_count, 35);
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.min_children_per_level, 1);
        assert_eq!(config.max_children_per_level, 8);
        assert_eq!(config.branching_probability, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejected_before_generation() {
        let mut identities = RosterIdentities::new();
        let mut rng = StdRng::from_seed([0u8; 32]);

        let cases = [
            (
                GeneratorConfig { root_count: 0, ..small_config() },
                ConfigError::ZeroRoots,
            ),
            (
                GeneratorConfig { max_depth: 0, ..small_config() },
                ConfigError::ZeroDepth,
            ),
            (
                GeneratorConfig {
                    min_children_per_level: 0,
                    max_children_per_level: 0,
                    ..small_config()
                },
                ConfigError::ZeroMaxChildren,
            ),
            (
                GeneratorConfig {
                    min_children_per_level: 6,
                    ..small_config()
                },
                ConfigError::ChildrenRangeInverted { min: 6, max: 5 },
            ),
            (
                GeneratorConfig {
                    branching_probability: 0.0,
                    ..small_config()
                },
                ConfigError::BranchingProbability(0.0),
            ),
            (
                GeneratorConfig {
                    branching_probability: -0.5,
                    ..small_config()
                },
                ConfigError::BranchingProbability(-0.5),
            ),
        ];

        for (config, expected) in cases {
            let result = generate_forest(&config, &mut rng, &mut identities);
            assert_eq!(result, Err(expected));
        }

        let nan = GeneratorConfig {
            branching_probability: f64::NAN,
            ..small_config()
        };
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::BranchingProbability(_))
        ));
    }

    #[test]
    fn test_config_from_yaml_uses_defaults() {
        let config: GeneratorConfig =
            serde_yaml::from_str("root_count: 2\nbranching_probability: 1.0\n").unwrap();

        assert_eq!(config.root_count, 2);
        assert_eq!(config.branching_probability, 1.0);
        assert_eq!(config.max_depth, 12);
        assert_eq!(config.max_children_per_level, 8);
    }

    #[test]
    fn test_slot_bounds_shrink_with_depth() {
        let config = small_config();

        assert_eq!(config.slot_bounds(1), (1, 4));
        assert_eq!(config.slot_bounds(2), (0, 3));
        assert_eq!(config.slot_bounds(4), (0, 1));
        // upper bound never collapses to zero
        assert_eq!(config.slot_bounds(9), (0, 1));
    }

    #[test]
    fn test_survival_probability_decays_and_saturates() {
        let config = small_config();
        assert!((config.survival_probability(1) - 0.45).abs() < 1e-12);
        assert!((config.survival_probability(2) - 0.3).abs() < 1e-12);

        let eager = GeneratorConfig {
            branching_probability: 5.0,
            ..small_config()
        };
        assert_eq!(eager.survival_probability(1), 1.0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let config = small_config();
        assert_eq!(generate(&config, 7), generate(&config, 7));
    }

    #[test]
    fn test_different_seed_different_forest() {
        let config = small_config();
        assert_ne!(generate(&config, 7), generate(&config, 8));
    }

    #[test]
    fn test_ids_are_preorder_and_dense() {
        let forest = generate(&small_config(), 11);
        let order = preorder(&forest);

        for (position, (id, _)) in order.iter().enumerate() {
            assert_eq!(*id, position as AgentId);
        }
    }

    #[test]
    fn test_depth_never_exceeds_max() {
        let config = GeneratorConfig {
            branching_probability: 4.0,
            ..small_config()
        };
        let forest = generate(&config, 5);

        assert_eq!(forest.len(), config.root_count);
        let deepest = preorder(&forest).iter().map(|(_, d)| *d).max().unwrap();
        assert!(deepest <= config.max_depth);
    }

    #[test]
    fn test_earnings_shrink_with_depth() {
        let forest = generate(&small_config(), 21);
        let mut stack: Vec<(&AgentNode, usize)> = forest.iter().map(|n| (n, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            if depth == 0 {
                assert!((5_000.0..=25_000.0).contains(&node.earnings));
            } else {
                let cap = 5_000.0 / (depth + 1) as f64;
                let floor = 50.0 / (depth + 1) as f64;
                assert!(node.earnings >= floor && node.earnings <= cap);
            }
            assert!(node.earnings_30d >= node.earnings * 0.2 - 1e-9);
            assert!(node.earnings_30d <= node.earnings * 0.5 + 1e-9);
            assert_eq!(node.earnings_history.len(), EARNINGS_HISTORY_MONTHS);
            assert_eq!(node.activity_log.len(), 3);

            // derived fields stay untouched until aggregation
            assert_eq!(node.parent_id, None);
            assert_eq!(node.total_in_network, 0);

            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
    }
}
