//! Per-entry enrichment: resolve article text, check relevance, render.
//!
//! A [`Pipeline`] is built once at startup and shared by every poller behind
//! an `Arc`. It holds no per-feed state, so concurrent pollers can run it for
//! different entries at the same time.

use crate::config::Config;
use crate::content::ContentResolver;
use crate::models::{Entry, Item, Provenance};
use crate::outputs::formatter::OutputFormatter;
use crate::relevance::{RelevanceFilter, Verdict};
use crate::utils::strip_html;
use tracing::{debug, info, instrument};

#[derive(Debug)]
pub struct Pipeline {
    resolver: ContentResolver,
    relevance: Option<RelevanceFilter>,
    formatter: OutputFormatter,
}

impl Pipeline {
    pub fn new(
        resolver: ContentResolver,
        relevance: Option<RelevanceFilter>,
        formatter: OutputFormatter,
    ) -> Self {
        Self {
            resolver,
            relevance,
            formatter,
        }
    }

    /// Wire up the standard stages from configuration.
    pub fn from_config(
        client: reqwest::Client,
        config: &Config,
        relevance: Option<RelevanceFilter>,
    ) -> Self {
        Self::new(
            ContentResolver::new(client, config),
            relevance,
            OutputFormatter::new(config),
        )
    }

    /// Turn a new item into an output record.
    ///
    /// Returns `None` when the relevance filter suppresses the entry or when
    /// the entry has nothing to display.
    #[instrument(level = "debug", skip(self, item), fields(identity = %item.identity()))]
    pub async fn process(&self, feed_url: &str, channel_title: &str, item: &Item) -> Option<String> {
        let resolved = self.resolver.resolve(&item.link).await;

        let description = strip_html(&item.description);
        let (candidate, provenance) = if !resolved.is_empty() {
            (resolved.text.as_str(), resolved.provenance)
        } else if !description.is_empty() {
            (description.as_str(), Provenance::DescriptionOnly)
        } else {
            ("", Provenance::None)
        };
        debug!(%provenance, "Content resolved");

        let mut filtered = None;
        if let Some(filter) = &self.relevance {
            match filter.evaluate(candidate).await {
                Verdict::Suppress => {
                    info!(feed = %feed_url, title = %item.title, "Entry judged off topic; skipping");
                    return None;
                }
                Verdict::Replace(text) => filtered = Some(text),
                Verdict::Keep => {}
            }
        }

        let entry = Entry {
            feed_url,
            channel_title,
            item,
            extracted: resolved.text,
            filtered,
        };
        let record = self.formatter.render(&entry);
        if record.is_none() {
            debug!("Entry has no displayable fields; nothing to emit");
        }
        record
    }
}
