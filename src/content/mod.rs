//! Article text resolution for new feed entries.
//!
//! Given an entry's link, the [`ContentResolver`] walks an ordered list of
//! [`Strategy`] values and keeps the first one that yields non-empty text:
//!
//! | Strategy | Module | Needs |
//! |----------|--------|-------|
//! | Remote extraction | [`remote`] | extraction token |
//! | Local heuristic | [`heuristic`] | nothing |
//!
//! When every strategy comes back empty the resolver returns empty content and
//! the caller falls back to the feed's own description. Failures never escape
//! this module: each one is logged and the next strategy is tried.

pub mod heuristic;
pub mod remote;

use crate::config::Config;
use crate::models::{Provenance, ResolvedContent};
use thiserror::Error;
use tracing::{debug, instrument};

/// Why a single strategy produced nothing.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no text extracted")]
    Empty,
}

/// One way of turning a link into article text.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Ask a remote extraction API for the article body.
    RemoteExtraction { endpoint: String, token: String },
    /// Fetch the page and pick the main content out of its HTML.
    LocalHeuristic,
}

impl Strategy {
    fn provenance(&self) -> Provenance {
        match self {
            Strategy::RemoteExtraction { .. } => Provenance::RemoteExtraction,
            Strategy::LocalHeuristic => Provenance::LocalHeuristic,
        }
    }

    async fn attempt(
        &self,
        client: &reqwest::Client,
        link: &str,
        max_length: usize,
    ) -> Result<String, ContentError> {
        match self {
            Strategy::RemoteExtraction { endpoint, token } => {
                remote::extract(client, endpoint, token, link, max_length).await
            }
            Strategy::LocalHeuristic => heuristic::extract(client, link, max_length).await,
        }
    }
}

/// Resolves entry links into article text through a fallback chain.
#[derive(Debug, Clone)]
pub struct ContentResolver {
    client: reqwest::Client,
    strategies: Vec<Strategy>,
    max_length: usize,
}

impl ContentResolver {
    /// Build the standard chain: remote extraction when a token is configured,
    /// then the local heuristic.
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        let mut strategies = Vec::with_capacity(2);
        if let Some(token) = &config.extraction_token {
            strategies.push(Strategy::RemoteExtraction {
                endpoint: config.extraction_endpoint.clone(),
                token: token.clone(),
            });
        }
        strategies.push(Strategy::LocalHeuristic);
        Self::with_strategies(client, strategies, config.max_length)
    }

    pub fn with_strategies(
        client: reqwest::Client,
        strategies: Vec<Strategy>,
        max_length: usize,
    ) -> Self {
        Self {
            client,
            strategies,
            max_length,
        }
    }

    /// Best-effort article text for `link`. Never fails; empty when nothing worked.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, link: &str) -> ResolvedContent {
        if link.trim().is_empty() {
            return ResolvedContent::empty();
        }

        for strategy in &self.strategies {
            let provenance = strategy.provenance();
            match strategy.attempt(&self.client, link, self.max_length).await {
                Ok(text) if !text.is_empty() => {
                    debug!(%provenance, chars = text.chars().count(), "Resolved article text");
                    return ResolvedContent { text, provenance };
                }
                Ok(_) => debug!(%provenance, "Strategy returned empty text; trying next"),
                Err(e) => debug!(%provenance, error = %e, "Strategy failed; trying next"),
            }
        }

        ResolvedContent::empty()
    }
}
