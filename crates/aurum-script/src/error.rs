//! Error types for aurum-script

use thiserror::Error;

/// Errors raised while loading material and action definitions
#[derive(Error, Debug)]
pub enum Error {
    /// A definition file or directory could not be read
    #[error("cannot read definitions: {0}")]
    Io(#[from] std::io::Error),

    /// A file is not valid RON for its definition kind
    #[error("malformed definitions: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// A file is neither a materials nor an actions file
    #[error("not a definitions file: {0}")]
    InvalidSchema(String),

    /// A key, parameter flag or parameter choice list is empty
    #[error("definition is missing {0}")]
    MissingField(String),

    /// A material or action key appears twice across loaded files
    #[error("{0} is defined more than once")]
    DuplicateDefinition(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
