//! Reference resolution
//!
//! Replaces every `$ref` mapping with the node it designates, producing a
//! pointer-free tree.
//!
//! ## Rules
//! - Depth-first: a node's own reference is expanded before its children,
//!   so a target may contain further references.
//! - Sibling keys next to `$ref` survive and win over colliding keys of the
//!   resolved target.
//! - Cycles are not errors. A reference whose canonical locator is already
//!   being expanded on the current path becomes an empty mapping (plus its
//!   own siblings), which keeps self-referential schemas finite.
//! - Each canonical locator is expanded once; later occurrences reuse that
//!   expansion, including where it was cut short by a cycle.
//! - Anything that cannot be located fails with
//!   [`SpecError::UnresolvedReference`] naming the locator as written.

mod documents;
mod pointer;

use crate::fetch::DocumentFetcher;
use documents::DocumentSet;
use openapi2kong_common::{Mapping, Node, ParseOptions, Result, REF_KEY};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Resolve a document whose references are all internal
pub fn resolve_internal(root: Node) -> Result<Node> {
    let documents = DocumentSet::new("", root);
    Expander::new(&documents).expand_root()
}

/// Resolve a document, loading external documents through `fetcher`
pub async fn resolve(
    root: Node,
    options: &ParseOptions,
    fetcher: Option<&dyn DocumentFetcher>,
) -> Result<Node> {
    let root_id = options.base_uri.clone().unwrap_or_default();
    let documents =
        DocumentSet::load(root_id, root, fetcher, options.max_external_documents).await?;
    Expander::new(&documents).expand_root()
}

struct Expander<'a> {
    documents: &'a DocumentSet,
    in_progress: HashSet<String>,
    cache: HashMap<String, Node>,
    cycles_cut: usize,
}

impl<'a> Expander<'a> {
    fn new(documents: &'a DocumentSet) -> Self {
        Self {
            documents,
            in_progress: HashSet::new(),
            cache: HashMap::new(),
            cycles_cut: 0,
        }
    }

    fn expand_root(mut self) -> Result<Node> {
        let documents = self.documents;
        let resolved = self.expand(documents.root(), documents.root_id())?;
        if self.cycles_cut > 0 {
            debug!(cycles = self.cycles_cut, "cut cyclic references");
        }
        Ok(resolved)
    }

    fn expand(&mut self, node: &'a Node, document: &str) -> Result<Node> {
        match node {
            Node::Object(map) => {
                if let Some(Node::String(locator)) = map.get(REF_KEY) {
                    return self.expand_reference(locator, map, document);
                }

                let mut out = Mapping::new();
                for (key, value) in map {
                    out.insert(key.clone(), self.expand(value, document)?);
                }
                Ok(Node::Object(out))
            }
            Node::Array(items) => items
                .iter()
                .map(|item| self.expand(item, document))
                .collect::<Result<Vec<_>>>()
                .map(Node::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn expand_reference(
        &mut self,
        locator: &str,
        reference: &'a Mapping,
        document: &str,
    ) -> Result<Node> {
        let documents = self.documents;
        let target = documents.locate(locator, document)?;
        let key = target.key();

        let resolved = if self.in_progress.contains(&key) {
            debug!(locator, "cyclic reference, stopping expansion");
            self.cycles_cut += 1;
            Node::Object(Mapping::new())
        } else if let Some(cached) = self.cache.get(&key) {
            trace!(locator, "reusing expanded reference");
            cached.clone()
        } else {
            trace!(locator, "expanding reference");

            self.in_progress.insert(key.clone());
            let expanded = self.expand(target.node, &target.document);
            self.in_progress.remove(&key);
            let expanded = expanded?;

            // Cut expansions are reused too: every locator expands once.
            self.cache.insert(key, expanded.clone());
            expanded
        };

        self.merge_siblings(locator, resolved, reference, document)
    }

    fn merge_siblings(
        &mut self,
        locator: &str,
        resolved: Node,
        reference: &'a Mapping,
        document: &str,
    ) -> Result<Node> {
        let mut siblings = reference.iter().filter(|(key, _)| *key != REF_KEY).peekable();
        if siblings.peek().is_none() {
            return Ok(resolved);
        }

        match resolved {
            Node::Object(mut target) => {
                for (key, value) in siblings {
                    target.insert(key.clone(), self.expand(value, document)?);
                }
                Ok(Node::Object(target))
            }
            other => {
                warn!(
                    locator,
                    "reference target is not a mapping, dropping sibling keys"
                );
                Ok(other)
            }
        }
    }
}
