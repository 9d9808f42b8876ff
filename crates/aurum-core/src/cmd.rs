//! Commands for the host's UI, produced by the synchronizer

use crate::{DocId, MaterialKey};
use serde::{Deserialize, Serialize};

/// A request the host carries out after a hook returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cmd {
    /// No operation
    None,

    /// Batch multiple commands
    Batch(Vec<Cmd>),

    /// Ask the user to pick a parameter value for an item
    ///
    /// The answer comes back through `Synchronizer::choose_parameter`, a
    /// dismissed prompt through `Synchronizer::decline_parameter`.
    RequestParameter {
        item: DocId,
        material: MaterialKey,
        /// Module flag the value is stored under
        parameter: String,
        choices: Vec<String>,
        default: String,
    },

    /// Show a warning banner; `message` is a localization key
    Warn { item: DocId, message: String },
}

impl Cmd {
    /// Create an empty command
    pub fn none() -> Self {
        Cmd::None
    }

    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        // Flatten nested batches and filter out None
        let mut flattened: Vec<Cmd> = cmds
            .into_iter()
            .flat_map(|cmd| match cmd {
                Cmd::None => vec![],
                Cmd::Batch(inner) => inner,
                other => vec![other],
            })
            .collect();

        match flattened.len() {
            0 => Cmd::None,
            1 => flattened.pop().unwrap_or(Cmd::None),
            _ => Cmd::Batch(flattened),
        }
    }

    /// Create a warning command
    pub fn warn(item: DocId, message: impl Into<String>) -> Self {
        Cmd::Warn {
            item,
            message: message.into(),
        }
    }

    /// Check if this is a None command
    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Flatten into a list of concrete commands
    pub fn into_vec(self) -> Vec<Cmd> {
        match self {
            Cmd::None => vec![],
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::into_vec).collect(),
            other => vec![other],
        }
    }
}
