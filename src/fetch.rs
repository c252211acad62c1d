//! Content fetchers for local and remote model repositories

use std::fs;
use std::path::PathBuf;

use reqwest::blocking::Client;
use tracing::{error, trace, warn};
use url::Url;

use crate::cancel::CancellationToken;
use crate::dtmi::{dtmi_to_path, Dtmi, EXPANDED_JSON_SUFFIX};
use crate::error::ResolverError;

/// Raw model content together with the location it was actually read from.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The document text.
    pub definition: String,
    /// Filesystem path or URL the content came from.
    pub path: String,
}

impl FetchResult {
    /// Whether the content is a pre-computed expanded bundle.
    pub fn from_expanded(&self) -> bool {
        self.path.ends_with(EXPANDED_JSON_SUFFIX)
    }
}

/// Capability interface over the two repository kinds.
///
/// One call performs a single candidate lookup: one filesystem probe or one
/// HTTP GET round, never more. The expanded-to-plain fallback sequence of
/// `TryFromExpanded` mode is driven by the resolution engine, which issues
/// two sequential calls.
///
/// Implementations hold no per-call state, so one fetcher may serve
/// concurrent resolution calls.
pub trait ModelFetcher: Send + Sync {
    fn fetch(
        &self,
        dtmi: &Dtmi,
        expanded: bool,
        token: &CancellationToken,
    ) -> Result<FetchResult, ResolverError>;
}

/// Reads models from a directory tree laid out by the path convention.
pub struct LocalFetcher {
    base: PathBuf,
}

impl LocalFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LocalFetcher { base: base.into() }
    }

    /// Absolute path a DTMI maps to under this repository.
    pub fn model_path(&self, dtmi: &Dtmi, expanded: bool) -> PathBuf {
        self.base.join(dtmi_to_path(dtmi, expanded))
    }
}

impl ModelFetcher for LocalFetcher {
    fn fetch(
        &self,
        dtmi: &Dtmi,
        expanded: bool,
        token: &CancellationToken,
    ) -> Result<FetchResult, ResolverError> {
        if token.is_cancelled() {
            return Err(ResolverError::Cancelled);
        }

        if !self.base.is_dir() {
            error!(
                "local repository directory '{}' not found or not accessible",
                self.base.display()
            );
            return Err(ResolverError::RepositoryNotFound {
                path: self.base.clone(),
            });
        }

        let candidate = self.model_path(dtmi, expanded);
        trace!("attempting to retrieve model content from '{}'", candidate.display());

        if !candidate.is_file() {
            warn!(
                "model file '{}' not found in local repository",
                candidate.display()
            );
            return Err(ResolverError::FileNotFound { path: candidate });
        }

        let definition = fs::read_to_string(&candidate)?;
        Ok(FetchResult {
            definition,
            path: candidate.display().to_string(),
        })
    }
}

/// Fetches models over HTTP(S) with a shared connection-pooled client.
///
/// The client is constructed once per process and injected; it carries no
/// per-call state, so concurrent resolution calls may share one fetcher.
#[derive(Debug)]
pub struct RemoteFetcher {
    base: Url,
    http: Client,
}

impl RemoteFetcher {
    pub fn new(base: &str, http: Client) -> Result<Self, ResolverError> {
        let mut base = Url::parse(base).map_err(|e| ResolverError::InvalidRepositoryLocation {
            location: base.to_string(),
            reason: e.to_string(),
        })?;

        // Url::join treats a path without a trailing slash as a file.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        Ok(RemoteFetcher { base, http })
    }

    /// Fully qualified URL a DTMI maps to under this repository.
    pub fn model_url(&self, dtmi: &Dtmi, expanded: bool) -> Url {
        // The relative path produced by the convention is always a valid
        // URL suffix, so join cannot fail here.
        self.base
            .join(&dtmi_to_path(dtmi, expanded))
            .unwrap_or_else(|_| self.base.clone())
    }
}

impl ModelFetcher for RemoteFetcher {
    fn fetch(
        &self,
        dtmi: &Dtmi,
        expanded: bool,
        token: &CancellationToken,
    ) -> Result<FetchResult, ResolverError> {
        if token.is_cancelled() {
            return Err(ResolverError::Cancelled);
        }

        let url = self.model_url(dtmi, expanded);
        trace!("attempting to retrieve model content from '{}'", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| ResolverError::RemoteFetchFailure {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("model URI '{}' returned HTTP status {}", url, status);
            return Err(ResolverError::RemoteFetchFailure {
                url: url.to_string(),
                reason: format!("HTTP status {}", status),
            });
        }

        let definition = response
            .text()
            .map_err(|e| ResolverError::RemoteFetchFailure {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(FetchResult {
            definition,
            path: url.to_string(),
        })
    }
}
