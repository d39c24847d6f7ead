//! Command-line interface definitions for Awful Feed Stream.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials and service endpoints can also come from environment variables.

use crate::config::{
    DEFAULT_EXTRACTION_ENDPOINT, DEFAULT_MAX_LENGTH, DEFAULT_REASONING_ENDPOINT,
};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Awful Feed Stream application.
///
/// # Examples
///
/// ```sh
/// # Compact lines on stdout
/// awful_feed_stream https://example.com/rss.xml https://another.com/feed.xml
///
/// # Full blocks appended to a file, channel labels, topic filter
/// awful_feed_stream -f -c -o news.txt --topic "rust programming" https://example.com/rss.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Feed URLs to watch
    #[arg(required = true, value_name = "FEED")]
    pub feeds: Vec<String>,

    /// Append output to this file instead of writing to stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print multi-line entries with title, link, content and date
    #[arg(short, long)]
    pub full: bool,

    /// Append the channel name (or feed host) to compact lines
    #[arg(short, long)]
    pub channel: bool,

    /// Maximum length of extracted article text
    #[arg(short, long, default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_length: usize,

    /// Only print entries an LLM judges relevant to this topic
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Seconds to wait between two polls of the same feed
    #[arg(long, default_value_t = 30)]
    pub interval_secs: u64,

    /// Diffbot token for remote article extraction
    #[arg(long, env = "DIFFBOT_TOKEN", hide_env_values = true)]
    pub diffbot_token: Option<String>,

    /// OpenAI API key for the relevance filter
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Article extraction endpoint
    #[arg(long, env = "EXTRACTION_ENDPOINT", default_value = DEFAULT_EXTRACTION_ENDPOINT)]
    pub extraction_endpoint: String,

    /// Chat-completions endpoint used by the relevance filter
    #[arg(long, env = "REASONING_ENDPOINT", default_value = DEFAULT_REASONING_ENDPOINT)]
    pub reasoning_endpoint: String,
}
