//! The host model and the store seam
//!
//! The synchronizer never owns state. It reads [`HostItem`] snapshots handed
//! to each hook, writes rule lists into the pending [`ItemChange`], and
//! creates or deletes sub-entities through a [`HostStore`].

use crate::Result;
use aurum_core::classify::{classify, ShapeHints};
use aurum_core::{ActionDef, ActionKey, Category, DocId, Grade, MaterialKey, Value, ValueMap};
use serde::{Deserialize, Serialize};

/// Snapshot of an equippable item as the host stores it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostItem {
    pub id: DocId,
    pub name: String,
    /// Host item type (`weapon`, `armor`, `shield`, ...)
    pub item_type: String,
    /// Host category within the type; shields may be armor with subtype `shield`
    pub subtype: Option<String>,
    pub base_item: Option<String>,
    pub group: Option<String>,
    pub material: Option<MaterialKey>,
    pub grade: Option<Grade>,
    /// Full rule list, including rules owned by other modules or users
    pub rules: Vec<ValueMap>,
    /// This module's flags on the item
    pub flags: ValueMap,
    /// Owning actor, if the item is embedded in one
    pub actor: Option<DocId>,
}

impl HostItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id: DocId::new(id),
            name: name.into(),
            item_type: item_type.into(),
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_base_item(mut self, base_item: impl Into<String>) -> Self {
        self.base_item = Some(base_item.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_material(mut self, material: impl Into<MaterialKey>, grade: Grade) -> Self {
        self.material = Some(material.into());
        self.grade = Some(grade);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(DocId::new(actor));
        self
    }

    pub fn with_rules(mut self, rules: Vec<ValueMap>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.insert(flag.into(), value.into());
        self
    }

    /// Effect category, or `None` for items materials do not apply to
    pub fn category(&self) -> Option<Category> {
        classify(&self.item_type, self.subtype.as_deref())
    }

    /// The material key, treating an empty key as no material
    pub fn material_key(&self) -> Option<&MaterialKey> {
        self.material.as_ref().filter(|k| !k.is_empty())
    }

    /// A string flag of this module
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(Value::as_str)
    }

    pub fn shape_hints(&self) -> ShapeHints<'_> {
        ShapeHints {
            base_item: self.base_item.as_deref(),
            group: self.group.as_deref(),
        }
    }
}

/// How a change affects one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldChange<T> {
    #[default]
    Unchanged,
    Set(T),
    Cleared,
}

impl<T: Clone> FieldChange<T> {
    /// The field value once the change is committed
    pub fn resolve(&self, current: Option<&T>) -> Option<T> {
        match self {
            FieldChange::Unchanged => current.cloned(),
            FieldChange::Set(value) => Some(value.clone()),
            FieldChange::Cleared => None,
        }
    }

    pub fn is_touched(&self) -> bool {
        !matches!(self, FieldChange::Unchanged)
    }
}

/// A pending update to an item, as seen by the pre- and post-commit hooks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChange {
    pub material: FieldChange<MaterialKey>,
    pub grade: FieldChange<Grade>,
    /// Module flags set by this change
    pub flags: ValueMap,
    /// Replacement rule list; filled in by `Synchronizer::prepare_update`
    pub rules: Option<Vec<ValueMap>>,
}

impl ItemChange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set material and grade together
    pub fn set_material(material: impl Into<MaterialKey>, grade: Grade) -> Self {
        Self {
            material: FieldChange::Set(material.into()),
            grade: FieldChange::Set(grade),
            ..Default::default()
        }
    }

    /// Clear material and grade
    pub fn clear_material() -> Self {
        Self {
            material: FieldChange::Cleared,
            grade: FieldChange::Cleared,
            ..Default::default()
        }
    }

    /// Build a change from the host's raw strings; empty strings clear the field
    pub fn from_strings(material: &str, grade: &str) -> Result<Self> {
        let material = match material {
            "" => FieldChange::Cleared,
            key => FieldChange::Set(MaterialKey::new(key)),
        };
        let grade = match grade {
            "" => FieldChange::Cleared,
            g => FieldChange::Set(g.parse::<Grade>()?),
        };
        Ok(Self {
            material,
            grade,
            ..Default::default()
        })
    }

    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = FieldChange::Set(grade);
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>, value: impl Into<Value>) -> Self {
        self.flags.insert(flag.into(), value.into());
        self
    }

    pub fn with_rules(mut self, rules: Vec<ValueMap>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Check whether material or grade is touched
    pub fn touches_material(&self) -> bool {
        self.material.is_touched() || self.grade.is_touched()
    }

    /// A string flag set by this change
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(Value::as_str)
    }

    /// Commit the change onto an item
    pub fn apply_to(&self, item: &mut HostItem) {
        item.material = self.material.resolve(item.material.as_ref());
        item.grade = self.grade.resolve(item.grade.as_ref());
        for (key, value) in &self.flags {
            item.flags.insert(key.clone(), value.clone());
        }
        if let Some(rules) = &self.rules {
            item.rules = rules.clone();
        }
    }
}

/// Metadata linking a granted action to the item that grants it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMeta {
    /// Owning module id
    pub module: String,
    pub source_item_id: DocId,
    pub action_key: ActionKey,
    pub material_slug: MaterialKey,
    pub grade: Grade,
    pub category: Category,
}

impl LinkMeta {
    /// Check whether this link was created for `item` by `module`
    pub fn links(&self, item: &DocId, module: &str) -> bool {
        self.module == module && &self.source_item_id == item
    }
}

/// A sub-entity (embedded action) on an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubEntityRecord {
    pub id: DocId,
    pub actor: DocId,
    pub name: String,
    /// Present only on sub-entities created by a synchronizer
    pub link: Option<LinkMeta>,
}

impl SubEntityRecord {
    /// Check whether this record is owned by `module`
    pub fn is_owned_by(&self, module: &str) -> bool {
        self.link.as_ref().map(|l| l.module == module).unwrap_or(false)
    }

    /// Check whether this record was granted by `item` under `module`
    pub fn is_linked_to(&self, item: &DocId, module: &str) -> bool {
        self.link.as_ref().map(|l| l.links(item, module)).unwrap_or(false)
    }
}

/// A sub-entity to create: a blueprint stamped with its link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubEntity {
    pub definition: ActionDef,
    pub link: LinkMeta,
}

/// Host document store holding actors and their embedded sub-entities
///
/// Calls are assumed to be persisted when they return `Ok`. Failures are
/// reported as [`crate::Error::Store`].
pub trait HostStore {
    /// All sub-entities embedded in an actor
    fn sub_entities(&self, actor: &DocId) -> Result<Vec<SubEntityRecord>>;

    /// Create sub-entities on an actor, in order, returning their ids
    fn create_sub_entities(&mut self, actor: &DocId, entries: Vec<NewSubEntity>) -> Result<Vec<DocId>>;

    /// Delete sub-entities from an actor, returning how many were removed
    fn delete_sub_entities(&mut self, actor: &DocId, ids: &[DocId]) -> Result<usize>;
}

/// Host registry of materials shown in the item sheet
pub trait MaterialRegistry {
    fn has_material(&self, key: &MaterialKey) -> bool;

    fn register_material(&mut self, key: &MaterialKey, label: &str);
}
