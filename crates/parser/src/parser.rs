//! Resolution pipeline: decode → resolve → normalize

use crate::decode::{decode, SpecInput};
use crate::document::ResolvedDocument;
use crate::fetch::DocumentFetcher;
use crate::normalize::normalize;
use crate::resolver::resolve;
use openapi2kong_common::{Node, ParseOptions, Result, SpecError};
use std::sync::Arc;
use tracing::debug;

/// Turns raw API descriptions into [`ResolvedDocument`]s
///
/// Without a fetcher only internal references resolve; an external locator
/// fails with [`SpecError::UnresolvedReference`].
///
/// # Example
/// ```rust,ignore
/// let parser = SpecParser::new()
///     .with_fetcher(FsFetcher::new().with_root("specs"))
///     .with_options(ParseOptions::default().with_base_uri("openapi.yaml"));
/// let document = parser.parse(std::fs::read_to_string("specs/openapi.yaml")?).await?;
/// ```
#[derive(Clone, Default)]
pub struct SpecParser {
    options: ParseOptions,
    fetcher: Option<Arc<dyn DocumentFetcher>>,
}

impl SpecParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Follow external references through `fetcher`
    pub fn with_fetcher<F: DocumentFetcher + 'static>(self, fetcher: F) -> Self {
        self.with_shared_fetcher(Arc::new(fetcher))
    }

    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Run the pipeline on one document
    pub async fn parse(&self, input: impl Into<SpecInput>) -> Result<ResolvedDocument> {
        let decoded = decode(input)?;
        debug!("resolving references");

        let resolved = resolve(decoded, &self.options, self.fetcher.as_deref()).await?;
        let Node::Object(mut root) = resolved else {
            return Err(SpecError::Decode(
                "Document root reference does not designate a mapping".to_string(),
            ));
        };

        normalize(&mut root);
        debug!("document resolved and normalized");

        Ok(ResolvedDocument::new(root, self.options.default_name.clone()))
    }
}

/// Resolve a document with default options and no external fetching
pub async fn parse_spec(input: impl Into<SpecInput>) -> Result<ResolvedDocument> {
    SpecParser::new().parse(input).await
}
