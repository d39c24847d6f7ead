//! Feed retrieval, decoding and per-feed polling.
//!
//! Each configured feed is watched by its own [`poller::FeedPoller`], which
//! loops through the same four phases forever:
//!
//! 1. **Fetching**: GET the feed URL
//! 2. **Parsing**: sniff the declared charset, decode it ([`charset`]) and parse the XML ([`parser`])
//! 3. **Reconciling**: compare item identities against the feed's tracking set
//! 4. **Sleeping**: wait a fixed interval, whatever the outcome of the cycle
//!
//! Any failure in the first two phases is logged and the poller simply sleeps
//! and tries again. A feed never takes another feed down with it.

pub mod charset;
pub mod parser;
pub mod poller;

use thiserror::Error;

/// Errors raised while fetching, decoding or parsing a feed.
///
/// All of them are recoverable: the poller logs them and retries after its
/// usual sleep.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),
    #[error("malformed document: {0}")]
    MalformedDocument(String),
}
