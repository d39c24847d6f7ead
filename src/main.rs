//! # Awful Feed Stream
//!
//! A long-running RSS watcher that polls a set of feeds, notices entries it
//! has not seen before, enriches them with the full article text and an
//! optional LLM topic filter, and streams them as plain text.
//!
//! ## Features
//!
//! - Polls any number of RSS 2.0 / 1.0 feeds concurrently, one task per feed
//! - Decodes legacy charsets (windows-1251, koi8-r, iso-8859-*, ...)
//! - Extracts article text through the Diffbot API or a local heuristic
//! - Filters and condenses entries by topic through an OpenAI-compatible API
//! - Writes compact one-line or full multi-line records to stdout or a file
//!
//! ## Usage
//!
//! ```sh
//! awful_feed_stream -c https://example.com/rss.xml https://another.com/feed.xml
//! ```
//!
//! ## Architecture
//!
//! Every feed runs the same cycle:
//! 1. **Fetching**: GET the feed and decode it to UTF-8
//! 2. **Reconciling**: keep only entries whose identity is new
//! 3. **Enriching**: resolve article text, then ask the relevance filter
//! 4. **Output**: send the rendered record to the single output task
//!
//! The first cycle of each feed only records what is already there, so only
//! entries published after startup are printed.

use clap::Parser;
use futures::future::join_all;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod content;
mod feeds;
mod models;
mod outputs;
mod pipeline;
mod relevance;
mod utils;

use cli::Cli;
use config::Config;
use feeds::poller::FeedPoller;
use outputs::sink;
use pipeline::Pipeline;
use relevance::{PromptTemplate, RelevanceFilter};

/// Records waiting for the output task before pollers start to wait.
const OUTPUT_BUFFER: usize = 256;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // Records go to stdout, so logs go to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_stream starting up");

    // Parse CLI
    let args = Cli::parse();
    let config = Config::from(args);
    debug!(?config, "Resolved configuration");

    // ---- Startup checks ----
    let template = match PromptTemplate::embedded() {
        Ok(template) => template,
        Err(e) => {
            error!(error = %e, "Embedded prompt template is invalid");
            return Err(e.into());
        }
    };

    let out = match sink::open_output(config.output.as_deref()).await {
        Ok(out) => out,
        Err(e) => {
            error!(
                path = ?config.output,
                error = %e,
                "Output file cannot be opened (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    };

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(HTTP_TIMEOUT)
        .build()?;

    // ---- Build the shared pipeline ----
    if config.extraction_token.is_none() {
        info!("No DIFFBOT_TOKEN set; using local article extraction only");
    }
    let relevance = RelevanceFilter::from_config(client.clone(), &config, template);
    if let Some(topic) = relevance.as_ref().and(config.topic.as_deref()) {
        info!(topic, "Topic filter enabled");
    }
    let pipeline = Arc::new(Pipeline::from_config(client.clone(), &config, relevance));

    // ---- Spawn output task and pollers ----
    let (tx, rx) = mpsc::channel::<String>(OUTPUT_BUFFER);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let writer = tokio::spawn(sink::run(rx, out));

    let pollers: Vec<_> = config
        .feeds
        .iter()
        .map(|url| {
            let poller = FeedPoller::new(
                url.clone(),
                client.clone(),
                Arc::clone(&pipeline),
                tx.clone(),
                config.poll_interval,
            );
            tokio::spawn(poller.run(shutdown_rx.clone()))
        })
        .collect();
    // The writer ends once every poller has dropped its sender.
    drop(tx);

    info!(
        feeds = config.feeds.len(),
        interval = ?config.poll_interval,
        full = config.full_output,
        "Watching feeds"
    );

    let pollers = join_all(pollers);
    tokio::pin!(pollers);
    let results = tokio::select! {
        results = &mut pollers => results,
        () = interrupted() => {
            info!("Interrupt received; shutting down");
            let _ = shutdown_tx.send(true);
            pollers.await
        }
    };
    for result in results {
        if let Err(e) = result {
            error!(error = %e, "Poller task failed");
        }
    }

    let written = writer.await.unwrap_or_else(|e| {
        error!(error = %e, "Output task failed");
        0
    });

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        entries = written,
        "Execution complete"
    );

    Ok(())
}

/// Resolves on Ctrl-C.
async fn interrupted() {
    interrupted_by(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. A handler that cannot be installed never
/// resolves, so the watcher keeps polling.
async fn interrupted_by<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "Failed to listen for interrupt; polling continues");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[tokio::test]
    async fn test_interrupt_resolves_on_signal() {
        let fired = tokio::time::timeout(
            Duration::from_secs(1),
            interrupted_by(async { Ok(()) }),
        )
        .await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn test_failed_signal_handler_keeps_running() {
        let fired = tokio::time::timeout(
            Duration::from_millis(50),
            interrupted_by(async { Err(io::Error::other("no signal handler")) }),
        )
        .await;
        assert!(fired.is_err());
    }
}
