//! Model resolution engine
//!
//! Turns a set of root DTMIs into the deduplicated transitive closure of
//! model documents, fetched through a content fetcher selected from the
//! repository location.

use std::collections::{HashSet, VecDeque};

use clap::ValueEnum;
use indexmap::IndexMap;
use reqwest::blocking::Client;
use tracing::{error, trace, warn};

use crate::cancel::CancellationToken;
use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use crate::fetch::{FetchResult, LocalFetcher, ModelFetcher, RemoteFetcher};
use crate::query::ModelQuery;

/// Default public device models endpoint.
pub const DEFAULT_REPOSITORY: &str = "https://devicemodels.azure.com";

/// Whether and how dependency references are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DependencyMode {
    /// Do not process dependency references.
    Disabled,
    /// Fetch the full transitive closure of dependencies.
    #[default]
    Enabled,
    /// Prefer pre-computed expanded bundles, falling back to plain documents.
    TryFromExpanded,
}

/// Per-client resolution configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverOptions {
    pub dependency_mode: DependencyMode,
}

impl ResolverOptions {
    pub fn new(dependency_mode: DependencyMode) -> Self {
        ResolverOptions { dependency_mode }
    }
}

/// Terminal outcome of a resolution call.
///
/// Cancellation is distinct from both success and failure; a cancelled call
/// never exposes a partial result.
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// The resolved closure, keyed by canonical DTMI in discovery order.
    Resolved(IndexMap<Dtmi, String>),
    /// Cancellation was observed before the worklist drained.
    Cancelled,
}

impl ResolutionOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolutionOutcome::Cancelled)
    }

    /// The resolved models, or `None` for a cancelled call.
    pub fn models(self) -> Option<IndexMap<Dtmi, String>> {
        match self {
            ResolutionOutcome::Resolved(models) => Some(models),
            ResolutionOutcome::Cancelled => None,
        }
    }
}

/// Resolve `roots` and their transitive dependencies through `fetcher`.
///
/// The worklist is FIFO; a DTMI referenced by multiple dependents is fetched
/// exactly once. Any fetch or content error aborts the whole call with no
/// partial result.
pub fn resolve_models(
    fetcher: &dyn ModelFetcher,
    roots: &[Dtmi],
    options: &ResolverOptions,
    token: &CancellationToken,
) -> Result<ResolutionOutcome, ResolverError> {
    let mut resolved: IndexMap<Dtmi, String> = IndexMap::new();
    let mut pending: VecDeque<Dtmi> = VecDeque::new();
    // Everything ever enqueued: the visited set plus the pending queue.
    let mut discovered: HashSet<Dtmi> = HashSet::new();

    for root in roots {
        if discovered.insert(root.clone()) {
            pending.push_back(root.clone());
        }
    }

    while let Some(target) = pending.pop_front() {
        if token.is_cancelled() {
            return Ok(ResolutionOutcome::Cancelled);
        }

        if resolved.contains_key(&target) {
            trace!("already processed '{}', skipping", target);
            continue;
        }
        trace!("processing '{}'", target);

        let result = match fetch_with_fallback(fetcher, &target, options, token) {
            Ok(result) => result,
            // Cancellation takes precedence over whatever the aborted fetch
            // sequence reported.
            Err(_) if token.is_cancelled() => return Ok(ResolutionOutcome::Cancelled),
            Err(err) => return Err(err),
        };

        // A pre-computed bundle is self-contained: splice its models in and
        // skip the recursive walk.
        if result.from_expanded() {
            let models = ModelQuery::new(&result.definition).expanded_models()?;
            for (id, definition) in models {
                resolved.entry(id).or_insert(definition);
            }
            continue;
        }

        let metadata = ModelQuery::new(&result.definition).metadata()?;

        if metadata.id != target {
            return Err(ResolverError::MismatchedRootId {
                expected: target.to_string(),
                parsed: metadata.id.to_string(),
            });
        }

        resolved.insert(target.clone(), result.definition);

        if options.dependency_mode != DependencyMode::Disabled {
            let dependencies = metadata.dependencies();
            if !dependencies.is_empty() {
                trace!(
                    "discovered dependencies: {}",
                    dependencies
                        .iter()
                        .map(Dtmi::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            for dep in dependencies {
                if discovered.insert(dep.clone()) {
                    pending.push_back(dep);
                }
            }
        }
    }

    Ok(ResolutionOutcome::Resolved(resolved))
}

/// One fetch per worklist item, with the expanded-to-plain fallback of
/// `TryFromExpanded` mode performed as two sequential single-candidate
/// fetches. Only a fetch miss falls back; a missing repository aborts.
fn fetch_with_fallback(
    fetcher: &dyn ModelFetcher,
    dtmi: &Dtmi,
    options: &ResolverOptions,
    token: &CancellationToken,
) -> Result<FetchResult, ResolverError> {
    if options.dependency_mode == DependencyMode::TryFromExpanded {
        match fetcher.fetch(dtmi, true, token) {
            Ok(result) => return Ok(result),
            Err(err) if err.is_fetch_miss() => {
                warn!("no expanded form of '{}' available, trying plain document", dtmi);
            }
            Err(err) => return Err(err),
        }
    }

    fetcher.fetch(dtmi, false, token)
}

/// `http://` or `https://` selects the remote fetcher; anything else is
/// treated as a local directory.
pub fn is_remote_location(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolution entry point bound to one repository location.
pub struct ResolverClient {
    fetcher: Box<dyn ModelFetcher>,
    options: ResolverOptions,
    location: String,
}

impl ResolverClient {
    /// Select the fetcher variant from the location's scheme. The HTTP
    /// transport is constructed once by the caller and injected; local
    /// repositories leave it unused.
    pub fn from_location(
        location: &str,
        options: ResolverOptions,
        http: Client,
    ) -> Result<Self, ResolverError> {
        let fetcher: Box<dyn ModelFetcher> = if is_remote_location(location) {
            trace!("client initialized with remote content fetcher");
            Box::new(RemoteFetcher::new(location, http)?)
        } else {
            trace!("client initialized with local content fetcher");
            Box::new(LocalFetcher::new(location))
        };

        Ok(ResolverClient {
            fetcher,
            options,
            location: location.to_string(),
        })
    }

    /// Wrap an arbitrary fetcher. Intended for embedding and tests.
    pub fn with_fetcher(fetcher: Box<dyn ModelFetcher>, options: ResolverOptions) -> Self {
        ResolverClient {
            fetcher,
            options,
            location: String::new(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Validate the given identifiers and resolve their closure.
    ///
    /// Validation of every root happens before any path construction or
    /// fetch work.
    pub fn resolve<'a, I>(
        &self,
        dtmis: I,
        token: &CancellationToken,
    ) -> Result<ResolutionOutcome, ResolverError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let roots = dtmis
            .into_iter()
            .map(|s| {
                Dtmi::parse(s).inspect_err(|_| {
                    error!("input DTMI '{}' has an invalid format", s);
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        resolve_models(self.fetcher.as_ref(), &roots, &self.options, token)
    }
}
