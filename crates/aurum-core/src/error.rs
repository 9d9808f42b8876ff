//! Error types for aurum-core

use thiserror::Error;

/// Core error type
///
/// Table lookups and rule compilation never fail; these errors only come from
/// parsing host-supplied names into the engine's closed enumerations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown grade: {0:?}")]
    UnknownGrade(String),

    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
