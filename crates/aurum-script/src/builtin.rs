//! Definitions shipped with the crate

use crate::error::Result;
use crate::loader::{Definitions, Loader};

const MATERIALS: &str = include_str!("../data/materials.ron");
const ACTIONS: &str = include_str!("../data/actions.ron");

/// Load the built-in materials and actions
pub fn builtin() -> Result<Definitions> {
    let mut loader = Loader::new();
    loader.load_materials_str(MATERIALS)?;
    loader.load_actions_str(ACTIONS)?;
    Ok(loader.finish())
}
