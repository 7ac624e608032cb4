//! Resolved document wrapper

use crate::metadata::{generate_slug, get_name_or, security_in_scopes, servers_in_scopes};
use openapi2kong_common::options::DEFAULT_NAME;
use openapi2kong_common::{Mapping, Node};
use serde::Serialize;

/// HTTP verbs that key operations inside a path item
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Spec family a document declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// OpenAPI 3.x (`openapi` key)
    OpenApi3,

    /// Swagger / OpenAPI 2.0 (`swagger` key)
    Swagger2,

    /// Neither key present
    Unknown,
}

/// A dereferenced, normalized API description
///
/// Guarantees: no reachable `$ref` mappings, `info` and `paths` are
/// mappings, `openapi`/`swagger` (when present) carry three-component
/// versions. Immutable; share it freely across threads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedDocument {
    root: Node,

    #[serde(skip)]
    default_name: String,
}

impl ResolvedDocument {
    pub(crate) fn new(root: Mapping, default_name: impl Into<String>) -> Self {
        Self {
            root: Node::Object(root),
            default_name: default_name.into(),
        }
    }

    /// The whole document tree
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_inner(self) -> Node {
        self.root
    }

    pub fn dialect(&self) -> Dialect {
        if self.root.get("openapi").is_some() {
            Dialect::OpenApi3
        } else if self.root.get("swagger").is_some() {
            Dialect::Swagger2
        } else {
            Dialect::Unknown
        }
    }

    /// Declared spec version, normalized
    pub fn version(&self) -> Option<&str> {
        self.root
            .get("openapi")
            .or_else(|| self.root.get("swagger"))
            .and_then(Node::as_str)
    }

    /// The `info` mapping; always present
    pub fn info(&self) -> &Node {
        &self.root["info"]
    }

    pub fn path_item(&self, path: &str) -> Option<&Node> {
        self.root["paths"].get(path)
    }

    /// All path items with their URL templates
    pub fn path_items(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.root["paths"]
            .as_object()
            .into_iter()
            .flat_map(|paths| paths.iter().map(|(path, item)| (path.as_str(), item)))
    }

    /// Operation for `method` (case-insensitive) under `path`
    pub fn operation(&self, path: &str, method: &str) -> Option<&Node> {
        let method = method.to_ascii_lowercase();
        if !HTTP_METHODS.contains(&method.as_str()) {
            return None;
        }
        self.path_item(path)?.get(method.as_str())
    }

    /// Operations of the path item at `path`, keyed by verb
    pub fn operations<'a>(&'a self, path: &str) -> impl Iterator<Item = (&'static str, &'a Node)> {
        let item = self.path_item(path);
        HTTP_METHODS
            .into_iter()
            .filter_map(move |method| Some((method, item?.get(method)?)))
    }

    /// Document-level servers
    pub fn servers(&self) -> Vec<Node> {
        servers_in_scopes(&[&self.root])
    }

    /// Servers for a path item, falling back to the document
    pub fn path_servers(&self, path: &str) -> Vec<Node> {
        match self.path_item(path) {
            Some(item) => servers_in_scopes(&[item, &self.root]),
            None => self.servers(),
        }
    }

    /// Servers for an operation: operation, then path item, then document
    pub fn operation_servers(&self, path: &str, method: &str) -> Vec<Node> {
        let scopes: Vec<&Node> = [self.operation(path, method), self.path_item(path)]
            .into_iter()
            .flatten()
            .chain(std::iter::once(&self.root))
            .collect();
        servers_in_scopes(&scopes)
    }

    /// Document-level security requirements
    pub fn security(&self) -> Vec<Node> {
        security_in_scopes(&[&self.root])
    }

    /// Security for an operation, falling back to the document
    pub fn operation_security(&self, path: &str, method: &str) -> Vec<Node> {
        match self.operation(path, method) {
            Some(operation) => security_in_scopes(&[operation, &self.root]),
            None => self.security(),
        }
    }

    /// Document name, see [`crate::get_name`]
    pub fn name(&self) -> String {
        get_name_or(&self.root, &self.default_name)
    }

    /// Slug of [`ResolvedDocument::name`]
    pub fn slug(&self) -> String {
        generate_slug(&self.name())
    }
}

impl Default for ResolvedDocument {
    fn default() -> Self {
        let mut root = Mapping::new();
        root.insert("info".to_string(), Node::Object(Mapping::new()));
        root.insert("paths".to_string(), Node::Object(Mapping::new()));
        Self::new(root, DEFAULT_NAME)
    }
}

impl AsRef<Node> for ResolvedDocument {
    fn as_ref(&self) -> &Node {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document(node: Node) -> ResolvedDocument {
        let Node::Object(map) = node else {
            panic!("test documents are mappings")
        };
        ResolvedDocument::new(map, DEFAULT_NAME)
    }

    fn petstore() -> ResolvedDocument {
        document(json!({
            "openapi": "3.0.0",
            "info": {"title": "Swagger Petstore"},
            "servers": [{"url": "https://api.example.com"}],
            "security": [{"apiKey": []}],
            "paths": {
                "/pets": {
                    "servers": [{"url": "https://pets.example.com"}],
                    "get": {"servers": [{"url": "https://read.example.com"}]},
                    "post": {"security": []},
                    "summary": "Pets"
                },
                "/users": {"delete": {}}
            }
        }))
    }

    #[test]
    fn test_dialect_and_version() {
        let doc = petstore();
        assert_eq!(doc.dialect(), Dialect::OpenApi3);
        assert_eq!(doc.version(), Some("3.0.0"));

        let swagger = document(json!({"swagger": "2.0.0", "info": {}, "paths": {}}));
        assert_eq!(swagger.dialect(), Dialect::Swagger2);

        assert_eq!(ResolvedDocument::default().dialect(), Dialect::Unknown);
        assert_eq!(ResolvedDocument::default().version(), None);
    }

    #[test]
    fn test_operations_skip_structural_fields() {
        let doc = petstore();
        let verbs: Vec<&str> = doc.operations("/pets").map(|(verb, _)| verb).collect();
        assert_eq!(verbs, vec!["get", "post"]);
        assert_eq!(doc.operations("/missing").count(), 0);
        assert!(doc.operation("/pets", "summary").is_none());
        assert!(doc.operation("/pets", "GET").is_some());
    }

    #[test]
    fn test_path_items() {
        let doc = petstore();
        let paths: Vec<&str> = doc.path_items().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["/pets", "/users"]);
    }

    #[test]
    fn test_server_cascade() {
        let doc = petstore();
        assert_eq!(doc.servers(), vec![json!({"url": "https://api.example.com"})]);
        assert_eq!(
            doc.path_servers("/pets"),
            vec![json!({"url": "https://pets.example.com"})]
        );
        assert_eq!(
            doc.operation_servers("/pets", "get"),
            vec![json!({"url": "https://read.example.com"})]
        );
        assert_eq!(
            doc.operation_servers("/pets", "post"),
            vec![json!({"url": "https://pets.example.com"})]
        );
        assert_eq!(
            doc.operation_servers("/users", "delete"),
            vec![json!({"url": "https://api.example.com"})]
        );
    }

    #[test]
    fn test_security_cascade() {
        let doc = petstore();
        assert!(doc.operation_security("/pets", "post").is_empty());
        assert_eq!(doc.operation_security("/pets", "get"), doc.security());
        assert_eq!(doc.security().len(), 1);
    }

    #[test]
    fn test_name_and_slug() {
        let doc = petstore();
        assert_eq!(doc.name(), "Swagger Petstore");
        assert_eq!(doc.slug(), "Swagger_Petstore");
        assert_eq!(ResolvedDocument::default().name(), "openapi");
    }

    #[test]
    fn test_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolvedDocument>();
    }

    #[test]
    fn test_serializes_as_tree() {
        let doc = ResolvedDocument::default();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"info": {}, "paths": {}})
        );
    }
}
