//! Skill-tree reference data and purchase rules.
//!
//! Trees are externally authored and may be imperfect: structurally
//! invalid nodes are skipped with a warning rather than failing the whole
//! tree, and the skip reason is surfaced so callers (and tests) can see
//! why a node was excluded.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::character::CharacterProfile;

/// One node in a skill tree's prerequisite graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTreeNode {
    pub id: String,
    pub name: String,
    /// Minimum character level, and the node's depth in the graph. Tier-1
    /// nodes carry no prerequisites.
    pub tier: i32,
    /// Skill-point cost to purchase.
    pub cost: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

/// A directed acyclic graph of purchasable skill nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTree {
    pub id: String,
    pub name: String,
    pub nodes: Vec<SkillTreeNode>,
}

impl SkillTree {
    pub fn node(&self, id: &str) -> Option<&SkillTreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Why a structurally invalid node was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingId,
    InvalidTier(i32),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingId => write!(f, "node has no id"),
            SkipReason::InvalidTier(tier) => write!(f, "node has invalid tier {tier}"),
        }
    }
}

/// Why a well-formed node is not yet unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockReason {
    LevelTooLow { required: i32, actual: i32 },
    MissingPrerequisite(String),
}

/// Availability of a node for a particular character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
    /// Structurally invalid reference data; treated as unavailable.
    Skipped(SkipReason),
    Locked(LockReason),
    Unlocked,
}

/// Evaluate a node's availability without logging.
pub fn evaluate_node(
    node: &SkillTreeNode,
    purchased: &HashSet<String>,
    character: &CharacterProfile,
) -> NodeStatus {
    if node.id.is_empty() {
        return NodeStatus::Skipped(SkipReason::MissingId);
    }
    if node.tier < 1 {
        return NodeStatus::Skipped(SkipReason::InvalidTier(node.tier));
    }
    if character.level < node.tier {
        return NodeStatus::Locked(LockReason::LevelTooLow {
            required: node.tier,
            actual: character.level,
        });
    }
    for prerequisite in &node.prerequisites {
        if !purchased.contains(prerequisite) {
            return NodeStatus::Locked(LockReason::MissingPrerequisite(prerequisite.clone()));
        }
    }
    NodeStatus::Unlocked
}

/// Whether the node is visible/purchasable for this character.
///
/// Fails soft on malformed reference data: logs a warning and reports the
/// node as locked instead of erroring.
pub fn is_unlocked(
    node: &SkillTreeNode,
    purchased: &HashSet<String>,
    character: &CharacterProfile,
) -> bool {
    match evaluate_node(node, purchased, character) {
        NodeStatus::Unlocked => true,
        NodeStatus::Locked(_) => false,
        NodeStatus::Skipped(reason) => {
            warn!(node = %node.name, %reason, "skipping malformed skill node");
            false
        }
    }
}

/// Whether the character can purchase the node right now.
pub fn can_purchase(
    node: &SkillTreeNode,
    purchased: &HashSet<String>,
    available_points: u32,
    character: &CharacterProfile,
) -> bool {
    !purchased.contains(&node.id)
        && is_unlocked(node, purchased, character)
        && available_points >= node.cost
}

/// Why a purchase was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseBlock {
    AlreadyPurchased,
    NotUnlocked,
    InsufficientPoints { cost: u32, available: u32 },
}

impl fmt::Display for PurchaseBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PurchaseBlock::AlreadyPurchased => write!(f, "already purchased"),
            PurchaseBlock::NotUnlocked => write!(f, "not unlocked"),
            PurchaseBlock::InsufficientPoints { cost, available } => {
                write!(f, "costs {cost} skill points, {available} available")
            }
        }
    }
}

/// Error type for skill-node purchases.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkillTreeError {
    #[error("skill node '{0}' does not exist in this tree")]
    NodeNotFound(String),
    #[error("skill node '{id}' cannot be purchased: {block}")]
    PurchaseNotAllowed { id: String, block: PurchaseBlock },
}

/// Purchase a node: append it to the character's purchased set and deduct
/// exactly its cost from the skill point pool. Never partially applies.
pub fn purchase(
    node_id: &str,
    character: &CharacterProfile,
    tree: &SkillTree,
) -> Result<CharacterProfile, SkillTreeError> {
    let node = tree
        .node(node_id)
        .ok_or_else(|| SkillTreeError::NodeNotFound(node_id.to_string()))?;

    let purchased = &character.purchased_skill_nodes;
    let available = character.progression_points.skill;

    let block = if purchased.contains(&node.id) {
        Some(PurchaseBlock::AlreadyPurchased)
    } else if !is_unlocked(node, purchased, character) {
        Some(PurchaseBlock::NotUnlocked)
    } else if available < node.cost {
        Some(PurchaseBlock::InsufficientPoints {
            cost: node.cost,
            available,
        })
    } else {
        None
    };
    if let Some(block) = block {
        return Err(SkillTreeError::PurchaseNotAllowed {
            id: node.id.clone(),
            block,
        });
    }

    let mut next = character.clone();
    next.purchased_skill_nodes.insert(node.id.clone());
    next.progression_points.skill = available - node.cost;
    Ok(next)
}
