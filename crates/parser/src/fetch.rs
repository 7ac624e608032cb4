//! External document fetching
//!
//! The resolver never performs I/O on its own. Callers that want external
//! references (`common.yaml#/Pet`, `https://.../pet.json`) followed hand in a
//! [`DocumentFetcher`]. Caching, retries and timeouts belong to the fetcher.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Capability that returns the raw text of an external document
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document designated by `uri`.
    ///
    /// `uri` is already joined against the referencing document's location.
    async fn fetch(&self, uri: &str) -> Result<String>;
}

/// Reads external documents from the local filesystem
///
/// Accepts plain paths and `file://` URLs. Relative paths are taken against
/// `root` when one is set, against the process working directory otherwise.
#[derive(Debug, Clone, Default)]
pub struct FsFetcher {
    root: Option<PathBuf>,
}

impl FsFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`
    pub fn with_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    fn path_for(&self, uri: &str) -> Result<PathBuf> {
        if let Ok(url) = Url::parse(uri) {
            if url.scheme() != "file" {
                anyhow::bail!("unsupported scheme '{}' for filesystem fetcher", url.scheme());
            }
            return url
                .to_file_path()
                .map_err(|_| anyhow::anyhow!("'{}' is not a valid file URL", uri));
        }

        let path = Path::new(uri);
        Ok(match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        })
    }
}

#[async_trait]
impl DocumentFetcher for FsFetcher {
    async fn fetch(&self, uri: &str) -> Result<String> {
        let path = self.path_for(uri)?;
        debug!(path = %path.display(), "reading external document");
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}
