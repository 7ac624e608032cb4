//! Locator and JSON pointer helpers

use crate::decode::kind_of;
use openapi2kong_common::Node;
use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Split a locator into its document part and optional fragment.
///
/// `#/components/schemas/Pet` → (`""`, `Some("/components/schemas/Pet")`)
/// `common.yaml#/Pet` → (`"common.yaml"`, `Some("/Pet")`)
/// `common.yaml` → (`"common.yaml"`, `None`)
pub(crate) fn split_locator(locator: &str) -> (&str, Option<&str>) {
    match locator.split_once('#') {
        Some((document, fragment)) => (document, Some(fragment)),
        None => (locator, None),
    }
}

/// Parse a fragment into decoded pointer segments.
///
/// An empty fragment designates the whole document. Anything else must be
/// a JSON pointer starting with `/`; plain-name anchors are rejected.
pub(crate) fn parse_pointer(fragment: &str) -> Result<Vec<String>, String> {
    if fragment.is_empty() {
        return Ok(Vec::new());
    }

    let rest = fragment
        .strip_prefix('/')
        .ok_or_else(|| format!("fragment '{}' is not a JSON pointer", fragment))?;

    Ok(rest.split('/').map(decode_pointer_segment).collect())
}

/// Decode a pointer segment: percent escapes first, then `~1` and `~0`.
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    decoded.replace("~1", "/").replace("~0", "~")
}

/// Walk `segments` from `root`
pub(crate) fn walk<'a>(root: &'a Node, segments: &[String]) -> Result<&'a Node, String> {
    let mut current = root;

    for segment in segments {
        current = match current {
            Node::Object(map) => map
                .get(segment)
                .ok_or_else(|| format!("missing key '{}'", segment))?,
            Node::Array(items) => {
                let index = parse_index(segment)?;
                items.get(index).ok_or_else(|| {
                    format!(
                        "index {} out of bounds for sequence of length {}",
                        index,
                        items.len()
                    )
                })?
            }
            other => {
                return Err(format!(
                    "cannot descend into {} at segment '{}'",
                    kind_of(other),
                    segment
                ))
            }
        };
    }

    Ok(current)
}

fn parse_index(segment: &str) -> Result<usize, String> {
    let well_formed = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));

    if !well_formed {
        return Err(format!("'{}' is not a sequence index", segment));
    }

    segment
        .parse()
        .map_err(|_| format!("'{}' is not a sequence index", segment))
}

/// Join the document part of a locator against the referencing document.
///
/// URLs join with RFC 3986 rules; anything else is treated as a filesystem
/// path relative to the base's parent directory, with `.` and `..` folded so
/// one file always gets one id.
pub(crate) fn join_document(base: Option<&str>, document: &str) -> String {
    if Url::parse(document).is_ok() {
        return document.to_string();
    }

    let Some(base) = base.filter(|b| !b.is_empty()) else {
        return canonical_document(document);
    };

    if let Ok(base_url) = Url::parse(base) {
        return base_url
            .join(document)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| document.to_string());
    }

    let joined = match Path::new(base).parent() {
        Some(parent) => parent.join(document),
        None => PathBuf::from(document),
    };
    fold_dots(&joined).to_string_lossy().into_owned()
}

/// Id of a document as it is keyed in the document set
pub(crate) fn canonical_document(id: &str) -> String {
    if id.is_empty() || Url::parse(id).is_ok() {
        return id.to_string();
    }
    fold_dots(Path::new(id)).to_string_lossy().into_owned()
}

// Lexical only: symlinks are not consulted.
fn fold_dots(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = out.components().next_back();
                if matches!(last, Some(Component::Normal(_))) {
                    out.pop();
                } else if !matches!(last, Some(Component::RootDir | Component::Prefix(_))) {
                    out.push(Component::ParentDir.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_locator() {
        assert_eq!(split_locator("#/a/b"), ("", Some("/a/b")));
        assert_eq!(split_locator("other.yaml#/a"), ("other.yaml", Some("/a")));
        assert_eq!(split_locator("other.yaml"), ("other.yaml", None));
        assert_eq!(split_locator("#"), ("", Some("")));
    }

    #[test]
    fn test_parse_pointer_escapes() {
        assert_eq!(
            parse_pointer("/paths/~1pets~1{id}/get").unwrap(),
            vec!["paths", "/pets/{id}", "get"]
        );
        assert_eq!(parse_pointer("/a~01").unwrap(), vec!["a~1"]);
        assert_eq!(
            parse_pointer("/components/schemas/User%20Profile").unwrap(),
            vec!["components", "schemas", "User Profile"]
        );
        assert!(parse_pointer("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pointer_rejects_anchor() {
        assert!(parse_pointer("pet").is_err());
    }

    #[test]
    fn test_walk_mappings_and_sequences() {
        let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        let segments = parse_pointer("/a/b/1/c").unwrap();
        assert_eq!(walk(&doc, &segments).unwrap(), &json!(2));
    }

    #[test]
    fn test_walk_errors() {
        let doc = json!({"a": [1], "s": "text"});
        assert!(walk(&doc, &parse_pointer("/missing").unwrap()).is_err());
        assert!(walk(&doc, &parse_pointer("/a/5").unwrap()).is_err());
        assert!(walk(&doc, &parse_pointer("/a/01").unwrap()).is_err());
        assert!(walk(&doc, &parse_pointer("/a/-").unwrap()).is_err());
        assert!(walk(&doc, &parse_pointer("/s/x").unwrap()).is_err());
    }

    #[test]
    fn test_join_document_urls() {
        assert_eq!(
            join_document(Some("https://example.com/specs/api.yaml"), "common.yaml"),
            "https://example.com/specs/common.yaml"
        );
        assert_eq!(
            join_document(Some("https://example.com/specs/api.yaml"), "https://other.io/x.json"),
            "https://other.io/x.json"
        );
    }

    #[test]
    fn test_join_document_paths() {
        assert_eq!(
            join_document(Some("specs/api.yaml"), "schemas/pet.yaml"),
            "specs/schemas/pet.yaml"
        );
        assert_eq!(join_document(None, "pet.yaml"), "pet.yaml");
        assert_eq!(join_document(Some(""), "pet.yaml"), "pet.yaml");
    }

    #[test]
    fn test_join_document_folds_dot_segments() {
        let base = Some("specs/schemas/Tree.yaml");
        assert_eq!(join_document(base, "../schemas/Tree.yaml"), "specs/schemas/Tree.yaml");
        assert_eq!(join_document(base, "./Tree.yaml"), "specs/schemas/Tree.yaml");
        assert_eq!(join_document(base, "../../../up.yaml"), "../up.yaml");
        assert_eq!(join_document(Some("/srv/api.yaml"), "../../x.yaml"), "/x.yaml");
        assert_eq!(join_document(None, "./pet.yaml"), "pet.yaml");
    }

    #[test]
    fn test_canonical_document() {
        assert_eq!(canonical_document(""), "");
        assert_eq!(canonical_document("./specs/../specs/api.yaml"), "specs/api.yaml");
        assert_eq!(
            canonical_document("https://example.com/specs/api.yaml"),
            "https://example.com/specs/api.yaml"
        );
    }
}
