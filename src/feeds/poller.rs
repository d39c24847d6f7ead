//! The per-feed polling loop and its deduplication state.

use super::{FeedError, parser::parse_feed};
use crate::models::{Feed, Item};
use crate::pipeline::Pipeline;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Identities already seen in one feed, plus whether the first cycle has run.
///
/// The set only grows. Nothing is evicted or persisted, so a restart treats
/// the current contents of every feed as already known.
#[derive(Debug, Default)]
pub struct FeedTrackingState {
    seen: HashSet<String>,
    seeded: bool,
}

impl FeedTrackingState {
    /// Mark every item as seen and return the ones that are new.
    ///
    /// The first call only seeds the set and returns nothing. Items without
    /// an identity are skipped entirely.
    pub fn reconcile(&mut self, items: &[Item]) -> Vec<Item> {
        let mut fresh = Vec::new();
        for item in items {
            let identity = item.identity();
            if identity.is_empty() {
                debug!(title = %item.title, "Item has neither guid nor link; skipping");
                continue;
            }
            if self.seen.insert(identity.to_string()) && self.seeded {
                fresh.push(item.clone());
            }
        }
        self.seeded = true;
        fresh
    }

    pub fn tracked(&self) -> usize {
        self.seen.len()
    }
}

/// Watches one feed URL and sends a record downstream for every new item.
pub struct FeedPoller {
    url: String,
    client: reqwest::Client,
    tracking: Mutex<FeedTrackingState>,
    pipeline: Arc<Pipeline>,
    output: mpsc::Sender<String>,
    interval: Duration,
}

impl FeedPoller {
    pub fn new(
        url: String,
        client: reqwest::Client,
        pipeline: Arc<Pipeline>,
        output: mpsc::Sender<String>,
        interval: Duration,
    ) -> Self {
        Self {
            url,
            client,
            tracking: Mutex::new(FeedTrackingState::default()),
            pipeline,
            output,
            interval,
        }
    }

    #[instrument(level = "debug", skip(self), fields(feed = %self.url))]
    async fn fetch(&self) -> Result<Feed, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus(status));
        }
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Fetched feed");
        parse_feed(&bytes)
    }

    /// Run one fetch/parse/reconcile cycle and push every new entry downstream.
    ///
    /// Returns how many records were sent.
    pub async fn poll_once(&self) -> Result<usize, FeedError> {
        let feed = self.fetch().await?;
        let channel = feed.channel;

        // Release the lock before any enrichment work.
        let fresh = {
            let mut tracking = self.tracking.lock().await;
            let fresh = tracking.reconcile(&channel.items);
            debug!(
                feed = %self.url,
                items = channel.items.len(),
                tracked = tracking.tracked(),
                new = fresh.len(),
                "Reconciled feed"
            );
            fresh
        };

        let mut sent = 0usize;
        for item in &fresh {
            let Some(record) = self.pipeline.process(&self.url, &channel.title, item).await else {
                continue;
            };
            if self.output.send(record).await.is_err() {
                warn!(feed = %self.url, "Output closed; dropping remaining entries");
                break;
            }
            sent += 1;
        }
        if sent > 0 {
            info!(feed = %self.url, count = sent, "Emitted new entries");
        }
        Ok(sent)
    }

    /// Poll until `shutdown` flips to `true` or its sender goes away.
    ///
    /// Failed cycles are logged and retried after the usual interval.
    #[instrument(level = "info", skip_all, fields(feed = %self.url))]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval = ?self.interval, "Polling started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let t0 = Instant::now();
            tokio::select! {
                result = self.poll_once() => match result {
                    Ok(count) => debug!(count, elapsed_ms = t0.elapsed().as_millis() as u64, "Cycle complete"),
                    Err(e) => warn!(error = %e, "Feed cycle failed; retrying after interval"),
                },
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }
        info!("Polling stopped");
    }
}
