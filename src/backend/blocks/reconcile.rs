//! Diffing a submitted block list against the stored one
//!
//! Planning is pure so the version rules can be tested without a store.
//! A stored block's content is normalized with the same rules as incoming
//! content before comparison, so a resubmitted block whose raw JSON differs
//! only in ways normalization erases keeps its version.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use uuid::Uuid;

use crate::shared::{BlockContent, BlockDraft, BlockType};

/// A block row as loaded before reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlock {
    /// Stored type name; unknown names never compare equal
    pub block_type: String,
    /// Stored content as JSON text
    pub content: String,
}

impl StoredBlock {
    /// Stored content under the current normalization rules, or `None`
    /// when the stored type is not one this build knows
    pub fn normalized(&self) -> Option<BlockContent> {
        let block_type = self.block_type.parse::<BlockType>().ok()?;
        let raw: Value = serde_json::from_str(&self.content).unwrap_or(Value::Null);
        Some(BlockContent::normalize(block_type, &raw))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockUpdate {
    pub block_id: Uuid,
    pub content: BlockContent,
    pub position: i64,
    /// 1 when type or normalized content changed, else 0
    pub version_bump: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockInsert {
    pub block_id: Uuid,
    pub content: BlockContent,
    pub position: i64,
}

/// Everything one ReplaceBlocks call writes, in execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub deletes: Vec<Uuid>,
    pub updates: Vec<BlockUpdate>,
    pub inserts: Vec<BlockInsert>,
}

impl ReconcilePlan {
    /// Number of blocks the lesson holds once the plan is applied
    pub fn surviving(&self) -> usize {
        self.updates.len() + self.inserts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.inserts.is_empty()
    }
}

/// Partition `drafts` against `stored` and derive each block's target
/// position and version bump.
///
/// Position is the draft's index in the submission. Moving a block never
/// bumps its version.
pub fn plan_reconciliation(
    stored: &HashMap<Uuid, StoredBlock>,
    drafts: &[BlockDraft],
) -> ReconcilePlan {
    let incoming: HashSet<Uuid> = drafts.iter().map(|draft| draft.block_id).collect();

    let mut deletes: Vec<Uuid> = stored
        .keys()
        .filter(|id| !incoming.contains(id))
        .copied()
        .collect();
    deletes.sort();

    let mut plan = ReconcilePlan {
        deletes,
        ..ReconcilePlan::default()
    };

    for (index, draft) in drafts.iter().enumerate() {
        let position = index as i64;
        match stored.get(&draft.block_id) {
            Some(existing) => {
                let unchanged = existing.normalized().as_ref() == Some(&draft.content);
                plan.updates.push(BlockUpdate {
                    block_id: draft.block_id,
                    content: draft.content.clone(),
                    position,
                    version_bump: if unchanged { 0 } else { 1 },
                });
            }
            None => plan.inserts.push(BlockInsert {
                block_id: draft.block_id,
                content: draft.content.clone(),
                position,
            }),
        }
    }

    plan
}
