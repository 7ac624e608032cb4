//! OpenAPI resolution core for declarative gateway config generation
//!
//! This crate turns a raw API description (OpenAPI 3.x or Swagger 2.0, as a
//! structured tree or JSON/YAML text) into a [`ResolvedDocument`]: every
//! `$ref` replaced by its target, versions normalized, `info` and `paths`
//! guaranteed. Generators then query it for servers, security and names.
//!
//! ## Pipeline
//!
//! - **decode**: JSON, then YAML; the root must be a mapping
//! - **resolve**: depth-first `$ref` expansion, cycles cut, external
//!   documents loaded through a caller-supplied [`DocumentFetcher`]
//! - **normalize**: `"3.0"` → `"3.0.0"`, missing `info`/`paths` → `{}`
//!
//! ## Usage
//! ```rust,ignore
//! use openapi2kong_parser::{generate_slug, get_servers, parse_spec};
//!
//! let document = parse_spec(yaml_text).await?;
//! let slug = generate_slug(&document.name());
//! let item = document.path_item("/pets").unwrap();
//! let servers = get_servers(item, document.root());
//! ```

pub mod decode;
mod document;
pub mod fetch;
pub mod metadata;
pub mod normalize;
mod parser;
pub mod resolver;

pub use decode::{Format, SpecInput};
pub use document::{Dialect, ResolvedDocument, HTTP_METHODS};
pub use fetch::{DocumentFetcher, FsFetcher};
pub use metadata::{generate_slug, get_name, get_security, get_servers};
pub use parser::{parse_spec, SpecParser};

pub use openapi2kong_common::{Node, ParseOptions, Result, SpecError};
