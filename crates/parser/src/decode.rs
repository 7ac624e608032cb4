//! Format detection and decoding
//!
//! Raw text is tried against an ordered list of [`Format`]s and the first one
//! that parses wins. JSON is tried first; YAML, being a superset, catches the
//! rest. Whatever the input, the decoded root must be a mapping.

use openapi2kong_common::{Mapping, Node, Result, SpecError};
use tracing::{debug, warn};

/// Input accepted by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum SpecInput {
    /// An already structured document
    Document(Node),

    /// Raw JSON or YAML text
    Text(String),
}

impl From<Node> for SpecInput {
    fn from(node: Node) -> Self {
        SpecInput::Document(node)
    }
}

impl From<String> for SpecInput {
    fn from(text: String) -> Self {
        SpecInput::Text(text)
    }
}

impl From<&str> for SpecInput {
    fn from(text: &str) -> Self {
        SpecInput::Text(text.to_string())
    }
}

/// Textual encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// Decode order used by [`decode`]
pub const DEFAULT_FORMATS: [Format; 2] = [Format::Json, Format::Yaml];

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
        }
    }

    /// Decode `text` with this format alone
    ///
    /// No root-shape check happens here; see [`decode_with`].
    pub fn decode(self, text: &str) -> Result<Node> {
        match self {
            Format::Json => serde_json::from_str(text)
                .map_err(|e| SpecError::Decode(format!("Failed to parse JSON: {}", e))),
            Format::Yaml => {
                let value: serde_yaml::Value = serde_yaml::from_str(text)
                    .map_err(|e| SpecError::Decode(format!("Failed to parse YAML: {}", e)))?;
                yaml_to_node(value)
            }
        }
    }
}

/// Decode any [`SpecInput`] into a mapping-rooted [`Node`]
pub fn decode(input: impl Into<SpecInput>) -> Result<Node> {
    match input.into() {
        SpecInput::Document(node) => ensure_mapping_root(node),
        SpecInput::Text(text) => decode_with(&text, &DEFAULT_FORMATS),
    }
}

/// Try `formats` in order; the first successful parse wins
pub fn decode_with(text: &str, formats: &[Format]) -> Result<Node> {
    parse_text(text, formats).and_then(ensure_mapping_root)
}

/// Like [`decode_with`] but accepts any root shape
///
/// External documents may be designated as a whole by a reference, so
/// their root is not required to be a mapping.
pub(crate) fn parse_text(text: &str, formats: &[Format]) -> Result<Node> {
    let mut failures = Vec::with_capacity(formats.len());

    for format in formats {
        match format.decode(text) {
            Ok(node) => {
                debug!(format = format.name(), "decoded document text");
                return Ok(node);
            }
            Err(e) => failures.push(e.to_string()),
        }
    }

    if failures.is_empty() {
        return Err(SpecError::Decode("No decode formats configured".to_string()));
    }

    Err(SpecError::Decode(format!(
        "Input matches no supported encoding: {}",
        failures.join("; ")
    )))
}

fn ensure_mapping_root(node: Node) -> Result<Node> {
    match node {
        Node::Object(_) => Ok(node),
        other => Err(SpecError::Decode(format!(
            "Document root must be a mapping, found {}",
            kind_of(&other)
        ))),
    }
}

/// Human-readable kind of a node, for diagnostics
pub(crate) fn kind_of(node: &Node) -> &'static str {
    match node {
        Node::Null => "null",
        Node::Bool(_) => "boolean",
        Node::Number(_) => "number",
        Node::String(_) => "string",
        Node::Array(_) => "sequence",
        Node::Object(_) => "mapping",
    }
}

fn yaml_to_node(value: serde_yaml::Value) -> Result<Node> {
    use serde_yaml::Value;

    Ok(match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => yaml_number_to_node(&n),
        Value::String(s) => Node::String(s),
        Value::Sequence(items) => Node::Array(
            items
                .into_iter()
                .map(yaml_to_node)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Mapping(map) => {
            let mut out = Mapping::new();
            for (key, value) in map {
                out.insert(yaml_key(key)?, yaml_to_node(value)?);
            }
            Node::Object(out)
        }
        Value::Tagged(tagged) => yaml_to_node(tagged.value)?,
    })
}

fn yaml_number_to_node(n: &serde_yaml::Number) -> Node {
    if let Some(i) = n.as_i64() {
        return Node::from(i);
    }
    if let Some(u) = n.as_u64() {
        return Node::from(u);
    }

    let f = n.as_f64().unwrap_or(f64::NAN);
    match serde_json::Number::from_f64(f) {
        Some(number) => Node::Number(number),
        None => {
            // JSON has no infinities or NaN; keep the YAML spelling.
            let text = if f.is_nan() {
                ".nan"
            } else if f > 0.0 {
                ".inf"
            } else {
                "-.inf"
            };
            warn!(value = text, "non-finite YAML number kept as a string");
            Node::String(text.to_string())
        }
    }
}

// YAML allows `200:` or `true:` as keys; JSON-equivalent documents spell
// them as strings.
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(SpecError::Decode(
            "YAML mapping keys must be scalars".to_string(),
        )),
    }
}
