//! File shapes of the RON definition files

use crate::error::{Error, Result};
use aurum_core::{ActionDef, MaterialDef};
use serde::Deserialize;

/// A `materials.ron` file
#[derive(Debug, Deserialize)]
pub struct MaterialFile {
    pub materials: Vec<MaterialDef>,
}

/// An `actions.ron` file
#[derive(Debug, Deserialize)]
pub struct ActionFile {
    pub actions: Vec<ActionDef>,
}

/// Reject material definitions the synchronizer could not use
pub fn validate_material(def: &MaterialDef) -> Result<()> {
    if def.key.is_empty() {
        return Err(Error::MissingField(format!("key of material {:?}", def.name)));
    }
    if let Some(parameter) = &def.parameter {
        if parameter.flag.is_empty() {
            return Err(Error::MissingField(format!("{}.parameter.flag", def.key)));
        }
        if parameter.choices.is_empty() {
            return Err(Error::MissingField(format!("{}.parameter.choices", def.key)));
        }
    }
    Ok(())
}

/// Reject action definitions without a key
pub fn validate_action(def: &ActionDef) -> Result<()> {
    if def.key.is_empty() {
        return Err(Error::MissingField(format!("key of action {:?}", def.name)));
    }
    Ok(())
}
