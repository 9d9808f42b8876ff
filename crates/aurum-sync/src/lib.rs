//! Aurum Sync - keeps material effects in step with host items
//!
//! The host owns every document. This crate reacts to its lifecycle hooks:
//!
//! ```text
//! pre-commit  ── Synchronizer::prepare_update ── rewrites owned rules in the change
//!     │
//! commit (host)
//!     │
//! post-commit ── Synchronizer::after_update ─── SyncPlan ── commit::apply ── HostStore
//!                                          └─── Cmd (prompts, warnings)
//! ```
//!
//! ## Key Components
//!
//! - [`Synchronizer`]: the lifecycle hooks
//! - [`HostStore`]: seam to the host's document store
//! - [`SyncPlan`]: ordered store operations produced by a hook
//! - [`MemoryHost`]: in-memory host with several sessions, for tests and demos
//!
//! Post-commit hooks are replayed in every session; only the session that
//! issued the change touches the store.

pub mod commit;
mod config;
mod error;
pub mod host;
pub mod memory;
pub mod plan;
mod synchronizer;

pub use commit::{apply, ApplyResult};
pub use config::{SyncConfig, DEFAULT_LABEL_PREFIX, DEFAULT_MODULE_ID};
pub use error::{Error, Result};
pub use host::{
    FieldChange, HostItem, HostStore, ItemChange, LinkMeta, MaterialRegistry, NewSubEntity,
    SubEntityRecord,
};
pub use memory::{MemoryHost, MemoryStore, SessionId};
pub use plan::{StoreOp, SyncPlan};
pub use synchronizer::Synchronizer;
