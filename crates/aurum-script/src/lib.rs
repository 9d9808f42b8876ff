//! Aurum Script - RON loader and built-in definitions
//!
//! Loads content from RON files:
//! - Materials with their per-grade, per-category effects
//! - Action blueprints granted to actors
//!
//! The shipped content is available through [`builtin`].

mod builtin;
mod error;
mod loader;
mod schema;

pub use builtin::builtin;
pub use error::{Error, Result};
pub use loader::{Definitions, Loader};
pub use schema::{ActionFile, MaterialFile};
