//! Minimal shape normalization of resolved documents
//!
//! Only three rewrites happen here, all idempotent:
//! - `openapi` / `swagger` versions `MAJOR.MINOR` become `MAJOR.MINOR.0`
//! - a missing or non-mapping `info` becomes `{}`
//! - a missing or non-mapping `paths` becomes `{}`
//!
//! Nothing else is touched so malformed documents stay visibly malformed.

use once_cell::sync::Lazy;
use openapi2kong_common::{Mapping, Node};
use regex::Regex;

/// Keys carrying the spec version, per dialect
pub const VERSION_KEYS: [&str; 2] = ["openapi", "swagger"];

static TWO_COMPONENT_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("valid version regex"));

/// Normalize a resolved document root in place
pub fn normalize(document: &mut Mapping) {
    for key in VERSION_KEYS {
        if let Some(version) = document.get_mut(key) {
            normalize_version(version);
        }
    }

    for key in ["info", "paths"] {
        if !matches!(document.get(key), Some(Node::Object(_))) {
            document.insert(key.to_string(), Node::Object(Mapping::new()));
        }
    }
}

/// Expand a version node to three components where possible
///
/// Numbers (YAML reads `openapi: 3.0` as a float) are rendered to strings
/// first. Other shapes are left alone.
pub fn normalize_version(version: &mut Node) {
    let text = match version {
        Node::String(s) => s.clone(),
        Node::Number(n) => n.to_string(),
        _ => return,
    };

    *version = Node::String(expand_version(&text));
}

/// `"3.0"` → `"3.0.0"`; anything else is returned unchanged
pub fn expand_version(version: &str) -> String {
    if TWO_COMPONENT_VERSION.is_match(version) {
        format!("{}.0", version)
    } else {
        version.to_string()
    }
}
