//! Parse options
//!
//! Options can be built in code with the `with_*` setters or loaded from a
//! YAML (or JSON) file kept next to the specs a generator processes:
//!
//! ```yaml
//! base_uri: https://specs.example.com/petstore/openapi.yaml
//! max_external_documents: 16
//! default_name: petstore
//! ```

use crate::{Result, SpecError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Fallback name for documents without `x-kong-name` or `info.title`
pub const DEFAULT_NAME: &str = "openapi";

const DEFAULT_MAX_EXTERNAL_DOCUMENTS: usize = 64;

/// Options for a single resolution pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Base URI (or file path) that relative external locators in the root
    /// document are joined against
    pub base_uri: Option<String>,

    /// Upper bound on external documents loaded for one root document
    pub max_external_documents: usize,

    /// Name returned for documents without `x-kong-name` or a usable title
    pub default_name: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            base_uri: None,
            max_external_documents: DEFAULT_MAX_EXTERNAL_DOCUMENTS,
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

impl ParseOptions {
    /// Load options from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SpecError::Decode(format!("Failed to read options file {:?}: {}", path, e))
        })?;

        serde_yaml::from_str(&content).map_err(|e| {
            SpecError::Decode(format!(
                "Failed to parse options YAML from {:?}: {}",
                path, e
            ))
        })
    }

    /// Set the base URI for relative external locators
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Set the external document cap
    pub fn with_max_external_documents(mut self, max: usize) -> Self {
        self.max_external_documents = max;
        self
    }

    /// Set the document name fallback
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }
}
