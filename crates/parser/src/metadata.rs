//! Metadata extraction from resolved documents
//!
//! Pure queries over resolved nodes. None of them fail: missing data yields
//! an empty sequence or a fallback name.
//!
//! ## Override rules
//! - `servers`: a non-empty list at the narrower scope replaces the broader
//!   one entirely; an empty or missing list falls back.
//! - `security`: any declared list at the narrower scope replaces the broader
//!   one, including `[]` which means "no auth".

use once_cell::sync::Lazy;
use openapi2kong_common::options::DEFAULT_NAME;
use openapi2kong_common::Node;
use regex::Regex;

/// Extension field naming a document or path item for the gateway
pub const NAME_EXTENSION: &str = "x-kong-name";

static SLUG_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,]+").expect("valid slug regex"));

/// Servers applying to `node`, falling back to `document`
///
/// Entries come back exactly as declared. Pass the document root as both
/// arguments to query the document scope.
pub fn get_servers(node: &Node, document: &Node) -> Vec<Node> {
    servers_in_scopes(&[node, document])
}

/// Servers from the narrowest scope declaring a non-empty list
pub fn servers_in_scopes(scopes: &[&Node]) -> Vec<Node> {
    scopes
        .iter()
        .find_map(|scope| match scope.get("servers") {
            Some(Node::Array(entries)) if !entries.is_empty() => Some(entries.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Security requirements applying to `node`, falling back to `document`
pub fn get_security(node: &Node, document: &Node) -> Vec<Node> {
    security_in_scopes(&[node, document])
}

/// Security requirements from the narrowest scope declaring any list
pub fn security_in_scopes(scopes: &[&Node]) -> Vec<Node> {
    scopes
        .iter()
        .find_map(|scope| match scope.get("security") {
            Some(Node::Array(entries)) => Some(entries.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Name of a document or path item
///
/// 1. `x-kong-name`, when a non-empty string
/// 2. for documents, `info.title` when a non-empty string, else `"openapi"`
/// 3. for path items, the empty string
pub fn get_name(node: &Node) -> String {
    get_name_or(node, DEFAULT_NAME)
}

/// [`get_name`] with a custom document fallback
pub fn get_name_or(node: &Node, fallback: &str) -> String {
    if let Some(name) = non_empty_str(node.get(NAME_EXTENSION)) {
        return name.to_string();
    }

    if !is_document(node) {
        return String::new();
    }

    non_empty_str(node.get("info").and_then(|info| info.get("title")))
        .unwrap_or(fallback)
        .to_string()
}

/// Whether `node` is a document root rather than a path item
pub fn is_document(node: &Node) -> bool {
    ["openapi", "swagger", "paths"]
        .iter()
        .any(|key| node.get(key).is_some())
}

fn non_empty_str(node: Option<&Node>) -> Option<&str> {
    node.and_then(Node::as_str).filter(|s| !s.is_empty())
}

/// Identifier-safe form of a name
///
/// Every run of whitespace or commas becomes one `_`. Case and every other
/// character are preserved.
pub fn generate_slug(name: &str) -> String {
    SLUG_SEPARATORS.replace_all(name, "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn petstore() -> Node {
        json!({
            "openapi": "3.0.0",
            "info": {"version": "1.0.0", "title": "Swagger Petstore"},
            "servers": [{"url": "https://server1.com/path"}],
            "security": [{"anotherAuth": []}],
            "paths": {
                "/": {
                    "servers": [{"url": "https://server2.com/path"}],
                    "post": {"security": [{"petstoreAuth": ["write:pets"]}]},
                    "get": {"security": []},
                    "put": {}
                },
                "/empty": {"servers": []}
            }
        })
    }

    #[test]
    fn test_servers_path_item_overrides() {
        let doc = petstore();
        let servers = get_servers(&doc["paths"]["/"], &doc);
        assert_eq!(servers, vec![json!({"url": "https://server2.com/path"})]);
    }

    #[test]
    fn test_servers_document_scope() {
        let doc = petstore();
        assert_eq!(
            get_servers(&doc, &doc),
            vec![json!({"url": "https://server1.com/path"})]
        );
    }

    #[test]
    fn test_servers_empty_list_falls_back() {
        let doc = petstore();
        assert_eq!(
            get_servers(&doc["paths"]["/empty"], &doc),
            vec![json!({"url": "https://server1.com/path"})]
        );
    }

    #[test]
    fn test_servers_absent_everywhere() {
        let doc = json!({"paths": {"/": {}}});
        assert!(get_servers(&doc["paths"]["/"], &doc).is_empty());
    }

    #[test]
    fn test_servers_returned_as_declared() {
        let server = json!({
            "url": "https://api.example.com:{port}",
            "description": "main",
            "variables": {"port": {"default": 8443, "enum": [8443, 443]}},
            "x-internal": true
        });
        let doc = json!({"servers": [server.clone(), "not a server"]});
        assert_eq!(get_servers(&doc, &doc), vec![server, json!("not a server")]);
    }

    #[test]
    fn test_security_operation_overrides() {
        let doc = petstore();
        let security = get_security(&doc["paths"]["/"]["post"], &doc);
        assert_eq!(security, vec![json!({"petstoreAuth": ["write:pets"]})]);
    }

    #[test]
    fn test_security_explicitly_empty_means_no_auth() {
        let doc = petstore();
        assert!(get_security(&doc["paths"]["/"]["get"], &doc).is_empty());
    }

    #[test]
    fn test_security_falls_back_to_document() {
        let doc = petstore();
        let expected = vec![json!({"anotherAuth": []})];
        assert_eq!(get_security(&doc["paths"]["/"]["put"], &doc), expected);
        assert_eq!(get_security(&doc, &doc), expected);
    }

    #[test]
    fn test_security_scopes_returned_as_declared() {
        let doc = json!({"security": [{"oauth": [1, {"scope": "read"}]}]});
        assert_eq!(
            get_security(&doc, &doc),
            vec![json!({"oauth": [1, {"scope": "read"}]})]
        );
    }

    #[test]
    fn test_name_priority() {
        let mut doc = petstore();
        doc["x-kong-name"] = json!("override");
        assert_eq!(get_name(&doc), "override");

        let doc = petstore();
        assert_eq!(get_name(&doc), "Swagger Petstore");

        let doc = json!({"openapi": "3.0.0", "info": {"version": "1.0.0"}, "paths": {}});
        assert_eq!(get_name(&doc), "openapi");
        assert_eq!(get_name_or(&doc, "gateway"), "gateway");
    }

    #[test]
    fn test_name_ignores_empty_values() {
        let doc = json!({"x-kong-name": "", "info": {"title": ""}, "paths": {}});
        assert_eq!(get_name(&doc), "openapi");
    }

    #[test]
    fn test_path_item_name() {
        assert_eq!(get_name(&json!({"x-kong-name": "kong"})), "kong");
        assert_eq!(get_name(&json!({"summary": "Pets"})), "");
    }

    #[test]
    fn test_generate_slug() {
        assert_eq!(generate_slug("foo"), "foo");
        assert_eq!(generate_slug("foo bar"), "foo_bar");
        assert_eq!(generate_slug("foo,bar"), "foo_bar");
        assert_eq!(generate_slug("Foo Bar"), "Foo_Bar");
        assert_eq!(generate_slug("a ,\t b"), "a_b");
        assert_eq!(generate_slug("v1.0/pets"), "v1.0/pets");
        assert_eq!(generate_slug(""), "");
    }
}
