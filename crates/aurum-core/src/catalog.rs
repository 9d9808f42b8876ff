//! Catalog of action blueprints granted by materials

use crate::ActionKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Activation cost type of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Action,
    Reaction,
    Free,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Action => "action",
            ActionType::Reaction => "reaction",
            ActionType::Free => "free",
        }
    }
}

/// Blueprint of a sub-entity created on an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub key: ActionKey,
    pub name: String,
    /// Icon path
    pub img: String,
    /// HTML description
    pub description: String,
    pub action_type: ActionType,
    /// Number of actions, for `ActionType::Action` only
    #[serde(default)]
    pub actions: Option<u8>,
    #[serde(default)]
    pub traits: Vec<String>,
    /// Where the action comes from, shown to players
    #[serde(default)]
    pub source: String,
}

impl ActionDef {
    /// A free action with no icon or description
    pub fn new(key: impl Into<ActionKey>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            img: String::new(),
            description: String::new(),
            action_type: ActionType::Free,
            actions: None,
            traits: Vec::new(),
            source: String::new(),
        }
    }
}

/// Immutable mapping of action keys to blueprints
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: IndexMap<ActionKey, ActionDef>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action, returning the previous one under the same key
    pub fn insert(&mut self, def: ActionDef) -> Option<ActionDef> {
        self.actions.insert(def.key.clone(), def)
    }

    /// Get the blueprint for a key
    pub fn resolve(&self, key: &ActionKey) -> Option<&ActionDef> {
        self.actions.get(key)
    }

    pub fn contains(&self, key: &ActionKey) -> bool {
        self.actions.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDef> {
        self.actions.values()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
