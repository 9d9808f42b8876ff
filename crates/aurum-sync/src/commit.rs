//! Applying sync plans to a host store
//!
//! Operations run in plan order. The first failing operation stops the plan
//! and its error is returned; nothing is retried. Because every rebuild
//! starts with a teardown of the item's links, the next change to the same
//! item repairs a half-applied plan.

use crate::host::HostStore;
use crate::plan::{StoreOp, SyncPlan};
use crate::Result;
use aurum_core::DocId;

/// Outcome of a successfully applied plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyResult {
    /// Ids of sub-entities that were created
    pub created: Vec<DocId>,
    /// Number of sub-entities that were deleted
    pub deleted: usize,
}

impl ApplyResult {
    /// Create a new empty result
    pub fn new() -> Self {
        Self::default()
    }
}

/// Apply a plan to a store
pub fn apply<S: HostStore + ?Sized>(plan: SyncPlan, store: &mut S) -> Result<ApplyResult> {
    let mut result = ApplyResult::new();

    for op in plan.into_ops() {
        match op {
            StoreOp::DeleteSubEntities { actor, ids } => {
                let deleted = store.delete_sub_entities(&actor, &ids).map_err(|e| {
                    tracing::error!(%actor, error = %e, "failed to delete linked actions");
                    e
                })?;
                tracing::debug!(%actor, deleted, "removed linked actions");
                result.deleted += deleted;
            }

            StoreOp::CreateSubEntities { actor, entries } => {
                let created = store.create_sub_entities(&actor, entries).map_err(|e| {
                    tracing::error!(%actor, error = %e, "failed to create linked actions");
                    e
                })?;
                tracing::debug!(%actor, created = created.len(), "created linked actions");
                result.created.extend(created);
            }
        }
    }

    Ok(result)
}
