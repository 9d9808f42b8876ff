//! The effect table: material → grade → category → effects

use crate::material::{Category, Grade, MaterialDef};
use crate::rule::RuleTemplate;
use crate::{ActionKey, MaterialKey};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a (material, grade, category) combination grants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSpec {
    /// Rules injected into the item, in order
    pub rules: Vec<RuleTemplate>,
    /// Actions granted to the owning actor
    pub actions: Vec<ActionKey>,
    /// Reference text for the game master; never applied
    pub notes: Vec<String>,
}

impl EffectSpec {
    /// Check if this entry produces nothing
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.actions.is_empty()
    }
}

/// Immutable lookup table of all known materials
#[derive(Debug, Clone, Default)]
pub struct EffectTable {
    materials: IndexMap<MaterialKey, MaterialDef>,
}

impl EffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material, returning the previous definition under the same key
    pub fn insert(&mut self, def: MaterialDef) -> Option<MaterialDef> {
        self.materials.insert(def.key.clone(), def)
    }

    /// Get a material definition
    pub fn material(&self, key: &MaterialKey) -> Option<&MaterialDef> {
        self.materials.get(key)
    }

    /// Look up the effects of a combination; absent means no effects
    pub fn lookup(&self, material: &MaterialKey, grade: Grade, category: Category) -> Option<&EffectSpec> {
        self.materials.get(material)?.effects(grade, category)
    }

    /// Iterate over every material, in load order
    pub fn materials(&self) -> impl Iterator<Item = &MaterialDef> {
        self.materials.values()
    }

    /// Iterate over every (material, grade, category, effects) entry
    pub fn entries(&self) -> impl Iterator<Item = (&MaterialDef, Grade, Category, &EffectSpec)> {
        self.materials
            .values()
            .flat_map(|def| def.grades.iter().map(move |(g, c, spec)| (def, g, c, spec)))
    }

    /// Materials the host does not know natively
    pub fn custom_materials(&self) -> impl Iterator<Item = &MaterialDef> {
        self.materials.values().filter(|def| def.custom)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
