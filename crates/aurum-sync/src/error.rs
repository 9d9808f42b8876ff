//! Error types for aurum-sync

use aurum_core::{Cmd, DocId, MaterialKey};
use thiserror::Error;

/// Result type for aurum-sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aurum-sync
#[derive(Debug, Error)]
pub enum Error {
    /// Item not known to the host
    #[error("item {0} not found")]
    ItemNotFound(DocId),

    /// The item has no material to choose a parameter for
    #[error("item {0} has no material")]
    NoMaterial(DocId),

    /// The material takes no parameter
    #[error("material {0} takes no parameter")]
    NoParameter(MaterialKey),

    /// Value is not one of the material's choices
    #[error("{value:?} is not a valid parameter for material {material}")]
    InvalidParameter { material: MaterialKey, value: String },

    /// A host store write or read failed; never retried
    #[error("store {op} failed: {reason}")]
    Store { op: &'static str, reason: String },

    /// Configuration could not be parsed
    #[error("config error: {0}")]
    Config(#[from] ron::error::SpannedError),

    /// Definitions could not be loaded
    #[error("script error: {0}")]
    Script(#[from] aurum_script::Error),

    /// Core error
    #[error("core error: {0}")]
    Core(#[from] aurum_core::Error),

    /// A hook failed after producing commands the host must still deliver
    #[error("{source}")]
    Interrupted { cmd: Cmd, source: Box<Error> },
}

impl Error {
    /// Create a store error
    pub fn store(op: &'static str, reason: impl Into<String>) -> Self {
        Error::Store {
            op,
            reason: reason.into(),
        }
    }

    /// Attach commands produced before the failure
    pub(crate) fn with_cmd(self, cmd: Cmd) -> Self {
        if cmd.is_none() {
            return self;
        }
        Error::Interrupted {
            cmd,
            source: Box::new(self),
        }
    }

    /// Split into the commands to deliver anyway and the underlying error
    pub fn into_parts(self) -> (Cmd, Error) {
        match self {
            Error::Interrupted { cmd, source } => (cmd, *source),
            other => (Cmd::none(), other),
        }
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
