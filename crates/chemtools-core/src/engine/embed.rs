use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use super::container::{Container, ResolveOutcome};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EmbedError {
    #[error("Failed to load script: {src}")]
    Load { src: String, reason: String },
}

impl EmbedError {
    pub fn load(src: &str, reason: impl Into<String>) -> Self {
        Self::Load {
            src: src.to_string(),
            reason: reason.into(),
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            Self::Load { src, .. } => src,
        }
    }
}

/// Retrieves one external script or frame source.
#[async_trait]
pub trait ScriptFetcher: Send + Sync {
    async fn fetch(&self, src: &str) -> Result<(), EmbedError>;
}

/// Sources that have already loaded during this session.
///
/// Only successes are remembered, so a failed source is fetched again the next time a tool asks
/// for it.
#[derive(Debug, Default)]
pub struct ScriptCache {
    loaded: HashSet<String>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self, src: &str) -> bool {
        self.loaded.contains(src)
    }

    /// Ensures every source in `sources` is loaded, fetching the missing ones concurrently.
    ///
    /// Each distinct source is fetched at most once per call. The first failure in request order
    /// is returned after all fetches have settled.
    pub async fn ensure_loaded(
        &mut self,
        fetcher: &dyn ScriptFetcher,
        sources: &[String],
    ) -> Result<(), EmbedError> {
        let mut seen = HashSet::new();
        let missing: Vec<&str> = sources
            .iter()
            .map(String::as_str)
            .filter(|src| !self.loaded.contains(*src) && seen.insert(*src))
            .collect();
        if missing.is_empty() {
            debug!(?sources, "All sources already loaded.");
            return Ok(());
        }

        let results = join_all(missing.iter().map(|src| fetcher.fetch(src))).await;

        let mut first_error = None;
        for (src, result) in missing.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    self.loaded.insert(src.to_string());
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Drives every pending load of `container` to completion.
///
/// Panels may request more sources once earlier ones have loaded, so this keeps going until the
/// container has nothing pending. Returns how many requests were applied.
pub async fn settle_pending(
    container: &mut Container,
    cache: &mut ScriptCache,
    fetcher: &dyn ScriptFetcher,
) -> usize {
    let mut applied = 0;
    while container.has_pending() {
        for request in container.take_pending() {
            if request.is_cancelled() {
                debug!(sources = ?request.sources, "Skipping cancelled load request.");
                continue;
            }
            let outcome = cache.ensure_loaded(fetcher, &request.sources).await;
            if container.resolve(&request, outcome) == ResolveOutcome::Applied {
                applied += 1;
            }
        }
    }
    if applied > 0 {
        info!(applied, "External loads settled.");
    }
    applied
}
