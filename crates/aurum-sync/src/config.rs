//! Synchronizer configuration
//!
//! The module id scopes everything the synchronizer writes to host
//! documents: the ownership flag on rules, the link metadata on granted
//! actions and the item flags holding parameter values.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Default module id
pub const DEFAULT_MODULE_ID: &str = "precious-materials-rework";

/// Default prefix of generated rule labels
pub const DEFAULT_LABEL_PREFIX: &str = "PMR";

/// Configuration for the synchronizer
///
/// # Example
///
/// ```
/// use aurum_sync::SyncConfig;
///
/// let config = SyncConfig::default();
/// assert_eq!(config.module_id(), "precious-materials-rework");
/// assert!(config.prompt_for_parameters());
///
/// let config = SyncConfig::default()
///     .with_module_id("my-materials")
///     .with_prompt_for_parameters(false);
/// assert_eq!(config.module_id(), "my-materials");
/// assert!(!config.prompt_for_parameters());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Owner tag written into rule flags and sub-entity links
    module_id: String,
    /// Prefix of generated labels
    label_prefix: String,
    /// Emit `Cmd::RequestParameter` when a parameterized material is set
    prompt_for_parameters: bool,
}

impl SyncConfig {
    /// Parse a configuration from RON; missing fields keep their defaults
    ///
    /// # Example
    ///
    /// ```
    /// use aurum_sync::SyncConfig;
    ///
    /// let config = SyncConfig::from_ron_str(r#"(label_prefix: "MAT")"#).unwrap();
    /// assert_eq!(config.label_prefix(), "MAT");
    /// assert_eq!(config.module_id(), "precious-materials-rework");
    /// ```
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn with_module_id(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = module_id.into();
        self
    }

    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub fn with_prompt_for_parameters(mut self, prompt: bool) -> Self {
        self.prompt_for_parameters = prompt;
        self
    }

    /// Get the module id
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Get the label prefix
    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }

    /// Check whether parameter prompts are emitted
    pub fn prompt_for_parameters(&self) -> bool {
        self.prompt_for_parameters
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            module_id: DEFAULT_MODULE_ID.to_string(),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            prompt_for_parameters: true,
        }
    }
}
