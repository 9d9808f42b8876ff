//! Aurum Core - material effect tables and rule compilation
//!
//! This crate provides the data model shared by the other aurum crates:
//! - Identifiers for host documents and loaded definitions
//! - Dynamic values in the host's document shape (`Value`, `ValueMap`)
//! - The effect table: material → grade → category → `EffectSpec`
//! - Rule templates and the compiler that turns them into tagged rules
//! - The action catalog granted to actors
//! - Item classification and advisory compatibility checks
//!
//! Nothing here touches a host store. Lookups and compilation are pure and
//! never fail; see `aurum-sync` for the lifecycle side.

mod catalog;
pub mod classify;
mod cmd;
pub mod compile;
mod error;
mod identity;
pub mod material;
pub mod rule;
mod table;
pub mod value;

pub use catalog::{ActionCatalog, ActionDef, ActionType};
pub use classify::{check_compatibility, classify, CompatWarning, ShapeHints};
pub use cmd::Cmd;
pub use compile::{compile, compile_all, CompileContext};
pub use error::{Error, Result};
pub use identity::{ActionKey, DefId, DocId, MaterialKey};
pub use material::{Category, Grade, MaterialDef, ParameterSpec};
pub use rule::{ConcreteRule, RuleBody, RuleKind, RuleTemplate};
pub use table::{EffectSpec, EffectTable};
pub use value::{Value, ValueMap};
