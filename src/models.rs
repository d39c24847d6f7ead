//! Data models for feeds, their entries, and the enriched values built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Feed`], [`Channel`], [`Item`]: the parsed RSS document tree
//! - [`ResolvedContent`] and [`Provenance`]: article text chosen by the extraction chain
//! - [`Entry`]: everything the output formatter needs to render one new item

use std::fmt;

/// A parsed RSS document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    /// The single channel carried by the document.
    pub channel: Channel,
}

/// The channel of a feed and its items in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Items in the order they appear in the document (not sorted by date).
    pub items: Vec<Item>,
}

/// One article-like record inside a channel.
///
/// Every field is optional in the source document; missing fields are empty
/// strings rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub title: String,
    pub link: String,
    /// Raw description, possibly carrying HTML markup.
    pub description: String,
    /// Publication date exactly as written in the feed.
    pub pub_date: String,
    pub guid: String,
}

impl Item {
    /// Deduplication key for this item: the guid when present, else the link.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let item = Item { guid: "abc".into(), link: "https://x/1".into(), ..Default::default() };
    /// assert_eq!(item.identity(), "abc");
    /// ```
    pub fn identity(&self) -> &str {
        if self.guid.is_empty() {
            &self.link
        } else {
            &self.guid
        }
    }
}

/// Where a piece of resolved article text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Returned by the remote extraction API.
    RemoteExtraction,
    /// Pulled out of the fetched page by the local main-content heuristic.
    LocalHeuristic,
    /// Nothing was extracted; the feed description stands in.
    DescriptionOnly,
    /// No text at all.
    None,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Provenance::RemoteExtraction => "remote-extraction",
            Provenance::LocalHeuristic => "local-heuristic",
            Provenance::DescriptionOnly => "description-only",
            Provenance::None => "none",
        };
        f.write_str(tag)
    }
}

/// Article text produced by the content resolver, tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub text: String,
    pub provenance: Provenance,
}

impl ResolvedContent {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            provenance: Provenance::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A new item together with everything gathered about it downstream of the poller.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    /// URL of the feed the item was found in.
    pub feed_url: &'a str,
    /// Title of that feed's channel.
    pub channel_title: &'a str,
    pub item: &'a Item,
    /// Text extracted from the item's link, if any.
    pub extracted: String,
    /// Content rewritten by the relevance filter, if it ran and matched.
    pub filtered: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(guid: &str, link: &str) -> Item {
        Item {
            guid: guid.to_string(),
            link: link.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_identity_prefers_guid() {
        assert_eq!(item("test-guid", "https://example.com").identity(), "test-guid");
    }

    #[test]
    fn test_identity_falls_back_to_link() {
        assert_eq!(
            item("", "https://example.com/item").identity(),
            "https://example.com/item"
        );
    }

    #[test]
    fn test_distinct_guids_with_same_link_differ() {
        let a = item("guid-1", "https://example.com/same");
        let b = item("guid-2", "https://example.com/same");
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_empty_when_both_missing() {
        assert_eq!(item("", "").identity(), "");
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::RemoteExtraction.to_string(), "remote-extraction");
        assert_eq!(Provenance::DescriptionOnly.to_string(), "description-only");
        assert!(ResolvedContent::empty().is_empty());
    }
}
