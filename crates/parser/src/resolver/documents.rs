//! Loaded document set
//!
//! Holds the root document plus every external document reachable from it.
//! Loading happens up front in rounds: each round fetches the documents newly
//! discovered by the previous one concurrently, then scans them for further
//! external locators.

use super::pointer::{canonical_document, join_document, parse_pointer, split_locator, walk};
use crate::decode::{parse_text, DEFAULT_FORMATS};
use crate::fetch::DocumentFetcher;
use futures::future::try_join_all;
use openapi2kong_common::{Node, Result, SpecError, REF_KEY};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A reference target inside the document set
pub(crate) struct Target<'a> {
    /// Id of the document holding the target
    pub document: String,
    /// Fragment inside that document
    pub pointer: String,
    pub node: &'a Node,
}

impl Target<'_> {
    /// Canonical locator used for cycle detection and memoization
    pub fn key(&self) -> String {
        format!("{}#{}", self.document, self.pointer)
    }
}

/// Root document plus loaded external documents, keyed by document id
pub(crate) struct DocumentSet {
    root_id: String,
    documents: HashMap<String, Node>,
}

impl DocumentSet {
    /// A set holding only `root`, identified by `root_id`
    ///
    /// An empty `root_id` means the root has no known location.
    pub fn new(root_id: impl Into<String>, root: Node) -> Self {
        let root_id: String = root_id.into();
        let root_id = canonical_document(&root_id);
        let mut documents = HashMap::new();
        documents.insert(root_id.clone(), root);
        Self { root_id, documents }
    }

    /// Load the external documents reachable from the root
    pub async fn load(
        root_id: impl Into<String>,
        root: Node,
        fetcher: Option<&dyn DocumentFetcher>,
        max_external_documents: usize,
    ) -> Result<Self> {
        let mut set = Self::new(root_id, root);
        let mut pending = set.missing_documents(&[set.root_id.clone()]);

        while !pending.is_empty() {
            let Some(fetcher) = fetcher else {
                let (_, locator) = &pending[0];
                return Err(SpecError::unresolved(
                    locator.clone(),
                    "external reference but no document fetcher configured",
                ));
            };

            let loaded = set.documents.len() - 1;
            if loaded + pending.len() > max_external_documents {
                let (_, locator) = &pending[0];
                return Err(SpecError::unresolved(
                    locator.clone(),
                    format!(
                        "more than {} external documents referenced",
                        max_external_documents
                    ),
                ));
            }

            debug!(count = pending.len(), "fetching external documents");
            let fetched = try_join_all(
                pending
                    .iter()
                    .map(|(uri, locator)| fetch_document(fetcher, uri, locator)),
            )
            .await?;

            let mut new_ids = Vec::with_capacity(fetched.len());
            for (uri, node) in fetched {
                new_ids.push(uri.clone());
                set.documents.insert(uri, node);
            }
            pending = set.missing_documents(&new_ids);
        }

        Ok(set)
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn root(&self) -> &Node {
        &self.documents[&self.root_id]
    }

    /// Find the target of `locator` written inside document `from`
    pub fn locate(&self, locator: &str, from: &str) -> Result<Target<'_>> {
        let (document, fragment) = split_locator(locator);
        let document = if document.is_empty() {
            from.to_string()
        } else {
            join_document(base_of(from), document)
        };

        let root = self.documents.get(&document).ok_or_else(|| {
            SpecError::unresolved(locator, format!("document '{}' is not loaded", document))
        })?;

        let pointer = fragment.unwrap_or("");
        let segments =
            parse_pointer(pointer).map_err(|reason| SpecError::unresolved(locator, reason))?;
        let node = walk(root, &segments).map_err(|reason| SpecError::unresolved(locator, reason))?;

        Ok(Target {
            document,
            pointer: pointer.to_string(),
            node,
        })
    }

    /// External documents referenced from `ids` that are not loaded yet,
    /// each paired with the first locator that mentioned it
    fn missing_documents(&self, ids: &[String]) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();

        for id in ids {
            let mut locators = Vec::new();
            collect_locators(&self.documents[id], &mut locators);

            for locator in locators {
                let (document, _) = split_locator(locator);
                if document.is_empty() {
                    continue;
                }
                let uri = join_document(base_of(id), document);
                if !self.documents.contains_key(&uri) && seen.insert(uri.clone()) {
                    missing.push((uri, locator.to_string()));
                }
            }
        }

        missing
    }
}

fn base_of(id: &str) -> Option<&str> {
    (!id.is_empty()).then_some(id)
}

async fn fetch_document(
    fetcher: &dyn DocumentFetcher,
    uri: &str,
    locator: &str,
) -> Result<(String, Node)> {
    let text = fetcher.fetch(uri).await.map_err(|e| {
        SpecError::unresolved(locator, format!("failed to fetch '{}': {:#}", uri, e))
    })?;
    let node = parse_text(&text, &DEFAULT_FORMATS)
        .map_err(|e| SpecError::unresolved(locator, format!("'{}': {}", uri, e)))?;
    Ok((uri.to_string(), node))
}

fn collect_locators<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    match node {
        Node::Object(map) => {
            if let Some(Node::String(locator)) = map.get(REF_KEY) {
                out.push(locator);
            }
            for value in map.values() {
                collect_locators(value, out);
            }
        }
        Node::Array(items) => {
            for item in items {
                collect_locators(item, out);
            }
        }
        _ => {}
    }
}
