//! Store operations collected before they touch the host
//!
//! The synchronizer first reads the actor's sub-entities, then describes the
//! teardown and rebuild as a [`SyncPlan`]. [`crate::commit::apply`] runs the
//! plan against a [`crate::HostStore`], in order.

use crate::host::NewSubEntity;
use aurum_core::DocId;
use serde::{Deserialize, Serialize};

/// A single store operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreOp {
    /// Delete sub-entities from an actor
    DeleteSubEntities {
        /// The actor holding them
        actor: DocId,
        /// Sub-entity ids, already filtered to this module's links
        ids: Vec<DocId>,
    },

    /// Create sub-entities on an actor in one batch
    CreateSubEntities {
        /// The receiving actor
        actor: DocId,
        /// Stamped blueprints, in creation order
        entries: Vec<NewSubEntity>,
    },
}

impl StoreOp {
    /// Number of sub-entities this operation touches
    pub fn len(&self) -> usize {
        match self {
            StoreOp::DeleteSubEntities { ids, .. } => ids.len(),
            StoreOp::CreateSubEntities { entries, .. } => entries.len(),
        }
    }

    /// Check if the operation touches nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An ordered list of store operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPlan {
    ops: Vec<StoreOp>,
}

impl SyncPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operation; operations that touch nothing are dropped
    pub fn push(&mut self, op: StoreOp) {
        if !op.is_empty() {
            self.ops.push(op);
        }
    }

    /// Extend this plan with the operations of another
    pub fn extend(&mut self, other: SyncPlan) {
        self.ops.extend(other.ops);
    }

    /// Get the number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the plan is empty
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the plan and return the operations
    pub fn into_ops(self) -> Vec<StoreOp> {
        self.ops
    }
}
