//! Common types and utilities for openapi2kong
//!
//! This crate contains the document tree type, the error taxonomy and the
//! parse options shared by the parser crate and its downstream consumers.

pub mod options;

pub use options::ParseOptions;

use thiserror::Error;

/// A node of a parsed API description document.
///
/// Mappings, sequences and scalars map directly onto `serde_json::Value`.
/// Pointer references are plain mappings carrying a [`REF_KEY`] field.
pub type Node = serde_json::Value;

/// Mapping payload of a [`Node`].
pub type Mapping = serde_json::Map<String, Node>;

/// Field that marks a mapping as a pointer reference
pub const REF_KEY: &str = "$ref";

/// Errors that can occur while turning a raw document into a resolved one
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unresolved reference '{locator}': {reason}")]
    UnresolvedReference { locator: String, reason: String },
}

impl SpecError {
    /// Build an [`SpecError::UnresolvedReference`] for `locator`
    pub fn unresolved(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        SpecError::UnresolvedReference {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// The offending locator, for reference errors
    pub fn locator(&self) -> Option<&str> {
        match self {
            SpecError::UnresolvedReference { locator, .. } => Some(locator),
            SpecError::Decode(_) => None,
        }
    }
}

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, SpecError>;
