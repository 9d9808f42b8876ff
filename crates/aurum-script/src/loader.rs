//! RON definition loader

use crate::error::{Error, Result};
use crate::schema::{self, ActionFile, MaterialFile};
use aurum_core::{ActionCatalog, ActionDef, ActionKey, EffectTable, MaterialDef, MaterialKey};
use std::fs;
use std::path::Path;

/// Loaded material and action definitions
#[derive(Debug, Default)]
pub struct Definitions {
    /// Material effects by material key
    pub table: EffectTable,
    /// Action blueprints by action key
    pub catalog: ActionCatalog,
}

impl Definitions {
    /// Create empty definitions
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a material definition
    pub fn material(&self, key: &MaterialKey) -> Option<&MaterialDef> {
        self.table.material(key)
    }

    /// Get an action definition
    pub fn action(&self, key: &ActionKey) -> Option<&ActionDef> {
        self.catalog.resolve(key)
    }

    /// Action keys referenced by the table but missing from the catalog
    pub fn dangling_actions(&self) -> Vec<(MaterialKey, ActionKey)> {
        self.table
            .entries()
            .flat_map(|(def, _, _, spec)| spec.actions.iter().map(move |a| (def, a)))
            .filter(|(_, action)| !self.catalog.contains(action))
            .map(|(def, action)| (def.key.clone(), action.clone()))
            .collect()
    }
}

/// Loader for RON definition files
pub struct Loader {
    defs: Definitions,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            defs: Definitions::new(),
        }
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        // Try to determine the type based on content or filename
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if filename.contains("material") || content.contains("materials:") {
            self.load_materials_str(&content)
        } else if filename.contains("action") || content.contains("actions:") {
            self.load_actions_str(&content)
        } else {
            Err(Error::InvalidSchema(format!(
                "{}: neither a materials nor an actions file",
                path.display()
            )))
        }
    }

    /// Load materials from a RON string
    pub fn load_materials_str(&mut self, content: &str) -> Result<()> {
        let file: MaterialFile = ron::from_str(content)?;
        let count = file.materials.len();
        for material in file.materials {
            schema::validate_material(&material)?;
            if self.defs.table.material(&material.key).is_some() {
                return Err(Error::DuplicateDefinition(format!("material {}", material.key)));
            }
            self.defs.table.insert(material);
        }
        tracing::debug!(count, "loaded materials");
        Ok(())
    }

    /// Load actions from a RON string
    pub fn load_actions_str(&mut self, content: &str) -> Result<()> {
        let file: ActionFile = ron::from_str(content)?;
        let count = file.actions.len();
        for action in file.actions {
            schema::validate_action(&action)?;
            if self.defs.catalog.contains(&action.key) {
                return Err(Error::DuplicateDefinition(format!("action {}", action.key)));
            }
            self.defs.catalog.insert(action);
        }
        tracing::debug!(count, "loaded actions");
        Ok(())
    }

    /// Load all RON files from a directory
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        // Sorted so that load order (and duplicate errors) are stable
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                // Recursively load subdirectories
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading and return the definitions
    ///
    /// Dangling action references are logged, not rejected; the synchronizer
    /// skips them at runtime.
    pub fn finish(self) -> Definitions {
        for (material, action) in self.defs.dangling_actions() {
            tracing::warn!(%material, %action, "material grants an action missing from the catalog");
        }
        self.defs
    }

    /// Get the current definitions (for inspection during loading)
    pub fn defs(&self) -> &Definitions {
        &self.defs
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
