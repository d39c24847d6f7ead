//! Runtime configuration shared by every component.
//!
//! A [`Config`] is built once from the parsed [`Cli`] and handed to each
//! component's constructor, so pollers and pipelines never read process-wide
//! state and can be built with different settings side by side in tests.

use crate::cli::Cli;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default endpoint of the article extraction API.
pub const DEFAULT_EXTRACTION_ENDPOINT: &str = "https://api.diffbot.com/v3/article";
/// Default endpoint of the chat-completions API used by the relevance filter.
pub const DEFAULT_REASONING_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
/// Default cap on extracted article text, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 1000;
/// Default pause between two polls of the same feed.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Config {
    /// Feed URLs, one poller each.
    pub feeds: Vec<String>,
    /// Output file opened in append mode; stdout when `None`.
    pub output: Option<PathBuf>,
    /// Render the multi-line layout instead of the compact one.
    pub full_output: bool,
    /// Append a `[channel]` label to compact lines.
    pub include_channel: bool,
    /// Maximum length of extracted article text before truncation.
    pub max_length: usize,
    /// Topic for the relevance filter; the filter is off when `None`.
    pub topic: Option<String>,
    pub extraction_token: Option<String>,
    pub extraction_endpoint: String,
    pub reasoning_key: Option<String>,
    pub reasoning_endpoint: String,
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            output: None,
            full_output: false,
            include_channel: false,
            max_length: DEFAULT_MAX_LENGTH,
            topic: None,
            extraction_token: None,
            extraction_endpoint: DEFAULT_EXTRACTION_ENDPOINT.to_string(),
            reasoning_key: None,
            reasoning_endpoint: DEFAULT_REASONING_ENDPOINT.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Treat empty strings from flags or the environment as "not set".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            feeds: cli.feeds,
            output: cli.output,
            full_output: cli.full,
            include_channel: cli.channel,
            max_length: cli.max_length,
            topic: non_empty(cli.topic),
            extraction_token: non_empty(cli.diffbot_token),
            extraction_endpoint: cli.extraction_endpoint,
            reasoning_key: non_empty(cli.openai_api_key),
            reasoning_endpoint: cli.reasoning_endpoint,
            poll_interval: Duration::from_secs(cli.interval_secs.max(1)),
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("feeds", &self.feeds)
            .field("output", &self.output)
            .field("full_output", &self.full_output)
            .field("include_channel", &self.include_channel)
            .field("max_length", &self.max_length)
            .field("topic", &self.topic)
            .field("extraction_token", &self.extraction_token.as_ref().map(|_| "<set>"))
            .field("extraction_endpoint", &self.extraction_endpoint)
            .field("reasoning_key", &self.reasoning_key.as_ref().map(|_| "<set>"))
            .field("reasoning_endpoint", &self.reasoning_endpoint)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
