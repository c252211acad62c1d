//! Device Model Resolution Library
//!
//! This library resolves digital twin model identifiers (DTMIs) into model
//! document content, fetched from a local directory tree or a remote HTTP
//! endpoint laid out by the device models repository convention.
//!
//! # Overview
//!
//! Resolution turns a set of root DTMIs into the deduplicated transitive
//! closure of their documents:
//!
//! 1. Each identifier is validated against the DTMI grammar
//! 2. The path convention maps it to a repository-relative location
//! 3. A content fetcher (local filesystem or remote HTTP) reads the document
//! 4. Dependency references (`extends`, component schemas) are harvested and
//!    fed back into the worklist until the closure is complete
//!
//! Pre-computed `.expanded.json` bundles can short-circuit the recursive
//! walk, and a cooperative cancellation token stops a call between fetches.
//!
//! # Usage
//!
//! ```ignore
//! use dmr_resolver::{
//!     CancellationToken, ResolverClient, ResolverOptions, DEFAULT_REPOSITORY,
//! };
//!
//! let http = reqwest::blocking::Client::new();
//! let client = ResolverClient::from_location(
//!     DEFAULT_REPOSITORY,
//!     ResolverOptions::default(),
//!     http,
//! )?;
//!
//! let outcome = client.resolve(
//!     ["dtmi:com:example:Thermostat;1"],
//!     &CancellationToken::new(),
//! )?;
//!
//! if let Some(models) = outcome.models() {
//!     for (dtmi, definition) in &models {
//!         println!("{}: {} bytes", dtmi, definition.len());
//!     }
//! }
//! ```

pub mod cancel;
pub mod dtmi;
pub mod error;
pub mod fetch;
pub mod format;
pub mod query;
pub mod resolve;
pub mod validate;

// Re-export main types for convenience
pub use crate::cancel::CancellationToken;
pub use crate::dtmi::{dtmi_to_path, Dtmi, EXPANDED_JSON_SUFFIX, JSON_SUFFIX};
pub use crate::error::ResolverError;
pub use crate::fetch::{FetchResult, LocalFetcher, ModelFetcher, RemoteFetcher};
pub use crate::format::{format_models, ModelsFormat};
pub use crate::query::{ModelMetadata, ModelQuery};
pub use crate::resolve::{
    is_remote_location, resolve_models, DependencyMode, ResolutionOutcome, ResolverClient,
    ResolverOptions, DEFAULT_REPOSITORY,
};
pub use crate::validate::{
    validate_content, validate_file, validate_models, ValidationReport,
};
