//! Plain-text rendering of new entries.
//!
//! Two layouts are available:
//!
//! **Full** (`--full`), one block per entry:
//! ```text
//!
//! [2025-05-06 20:30:00] https://example.com/feed.xml
//! Title: Something happened
//! Link: https://example.com/something
//! Description: What happened, stripped of markup
//! Published: Tue, 06 May 2025 18:00:00 GMT
//! ---
//! ```
//!
//! **Compact** (default), one line per entry:
//! ```text
//! 06-05-2025 What happened, stripped of markup [Example]
//! ```

use crate::config::Config;
use crate::models::Entry;
use crate::utils::{collapse_whitespace, hostname, normalize_date, strip_html};
use chrono::Local;
use itertools::Itertools;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Compact-line labels with more space-separated words than this are replaced
/// by the feed host. Repeated spaces do not make extra words; tabs do not split.
const MAX_LABEL_WORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Full,
    Compact,
}

#[derive(Debug, Clone)]
pub struct OutputFormatter {
    layout: Layout,
    include_channel: bool,
}

impl OutputFormatter {
    pub fn new(config: &Config) -> Self {
        let layout = if config.full_output {
            Layout::Full
        } else {
            Layout::Compact
        };
        Self {
            layout,
            include_channel: config.include_channel,
        }
    }

    /// Render an entry, or `None` when it has nothing worth printing.
    pub fn render(&self, entry: &Entry<'_>) -> Option<String> {
        match self.layout {
            Layout::Full => {
                let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                Some(render_full(entry, &timestamp))
            }
            Layout::Compact => render_compact(entry, self.include_channel),
        }
    }
}

/// First non-empty of: filtered content, stripped description, extracted text.
fn body<'e>(entry: &'e Entry<'_>) -> Option<(&'static str, Cow<'e, str>)> {
    if let Some(filtered) = entry.filtered.as_deref().filter(|f| !f.trim().is_empty()) {
        return Some(("Content", filtered.into()));
    }
    let description = strip_html(&entry.item.description);
    if !description.is_empty() {
        return Some(("Description", description.into()));
    }
    if !entry.extracted.trim().is_empty() {
        return Some(("Content", entry.extracted.as_str().into()));
    }
    None
}

fn render_full(entry: &Entry<'_>, timestamp: &str) -> String {
    let item = entry.item;
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "\n[{}] {}", timestamp, entry.feed_url);
    let _ = writeln!(out, "Title: {}", item.title);
    let _ = writeln!(out, "Link: {}", item.link);
    if let Some((label, text)) = body(entry) {
        let _ = writeln!(out, "{label}: {text}");
    }
    if !item.pub_date.trim().is_empty() {
        let _ = writeln!(out, "Published: {}", item.pub_date);
    }
    out.push_str("---\n");
    out
}

/// Label shown in brackets at the end of a compact line.
pub fn channel_label(channel_title: &str, feed_url: &str) -> Option<String> {
    let title = channel_title.trim();
    let words = title.split(' ').filter(|word| !word.is_empty()).count();
    if !title.is_empty() && words <= MAX_LABEL_WORDS {
        return Some(title.to_string());
    }
    hostname(feed_url).or_else(|| (!title.is_empty()).then(|| title.to_string()))
}

fn render_compact(entry: &Entry<'_>, include_channel: bool) -> Option<String> {
    let date = normalize_date(&entry.item.pub_date);
    let content = body(entry)
        .map(|(_, text)| collapse_whitespace(&text))
        .unwrap_or_default();
    let label = if include_channel {
        channel_label(entry.channel_title, entry.feed_url).map(|l| format!("[{l}]"))
    } else {
        None
    };

    let line = [Some(date), Some(content), label]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .join(" ");
    if line.is_empty() {
        None
    } else {
        Some(format!("{line}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    const FEED: &str = "https://example.com/feed";

    fn full_item() -> Item {
        Item {
            title: "Test Item".to_string(),
            link: "https://example.com/item".to_string(),
            description: "Test Description".to_string(),
            pub_date: "Mon, 15 Mar 2023 10:30:00 GMT".to_string(),
            guid: "test-guid".to_string(),
        }
    }

    fn entry<'a>(item: &'a Item, channel: &'a str) -> Entry<'a> {
        Entry {
            feed_url: FEED,
            channel_title: channel,
            item,
            extracted: String::new(),
            filtered: None,
        }
    }

    fn compact(include_channel: bool) -> OutputFormatter {
        OutputFormatter {
            layout: Layout::Compact,
            include_channel,
        }
    }

    #[test]
    fn test_full_layout() {
        let item = full_item();
        let out = render_full(&entry(&item, "Test Channel"), "2025-05-06 20:30:00");
        assert!(out.starts_with("\n[2025-05-06 20:30:00] https://example.com/feed\n"));
        assert!(out.contains("Title: Test Item\n"));
        assert!(out.contains("Link: https://example.com/item\n"));
        assert!(out.contains("Description: Test Description\n"));
        assert!(out.contains("Published: Mon, 15 Mar 2023 10:30:00 GMT\n"));
        assert!(out.ends_with("---\n"));
    }

    #[test]
    fn test_full_layout_omits_empty_fields() {
        let item = Item {
            title: "Minimal Item".to_string(),
            link: "https://example.com/minimal".to_string(),
            ..Default::default()
        };
        let out = render_full(&entry(&item, "Test Channel"), "now");
        assert!(out.contains("Minimal Item"));
        assert!(!out.contains("Description:"));
        assert!(!out.contains("Content:"));
        assert!(!out.contains("Published:"));
    }

    #[test]
    fn test_full_layout_prefers_filtered_content() {
        let item = full_item();
        let mut e = entry(&item, "Test Channel");
        e.filtered = Some("Condensed".to_string());
        e.extracted = "Extracted".to_string();
        let out = render_full(&e, "now");
        assert!(out.contains("Content: Condensed\n"));
        assert!(!out.contains("Description:"));
    }

    #[test]
    fn test_full_layout_uses_extracted_without_description() {
        let item = Item {
            title: "t".to_string(),
            ..Default::default()
        };
        let mut e = entry(&item, "");
        e.extracted = "Extracted text".to_string();
        assert!(render_full(&e, "now").contains("Content: Extracted text\n"));
    }

    #[test]
    fn test_compact_layout() {
        let item = full_item();
        let line = compact(true).render(&entry(&item, "Test Channel")).unwrap();
        assert_eq!(line, "15-03-2023 Test Description [Test Channel]\n");
        assert!(!line.contains("Title:"));
        assert!(!line.contains(FEED));
    }

    #[test]
    fn test_compact_without_description() {
        let item = Item {
            description: String::new(),
            ..full_item()
        };
        let line = compact(true).render(&entry(&item, "Test Channel")).unwrap();
        assert_eq!(line, "15-03-2023 [Test Channel]\n");
    }

    #[test]
    fn test_compact_without_date() {
        let item = Item {
            pub_date: String::new(),
            description: "Test Description without date".to_string(),
            ..full_item()
        };
        let line = compact(true).render(&entry(&item, "Test Channel")).unwrap();
        assert_eq!(line, "Test Description without date [Test Channel]\n");
    }

    #[test]
    fn test_compact_keeps_unparseable_date_and_strips_markup() {
        let item = Item {
            pub_date: "sometime last week".to_string(),
            description: "<p>Hello <b>world</b>!</p>\n<p>More</p>".to_string(),
            ..full_item()
        };
        let line = compact(false).render(&entry(&item, "Test Channel")).unwrap();
        assert_eq!(line, "sometime last week Hello world! More\n");
    }

    #[test]
    fn test_compact_emits_nothing_without_displayable_fields() {
        let item = Item {
            title: "Item with no content".to_string(),
            link: "https://example.com/empty".to_string(),
            guid: "empty-guid".to_string(),
            ..Default::default()
        };
        assert_eq!(compact(false).render(&entry(&item, "")), None);
    }

    #[test]
    fn test_channel_label_heuristic() {
        assert_eq!(channel_label("Test Channel", FEED).as_deref(), Some("Test Channel"));
        assert_eq!(
            channel_label("The Daily Noisy Channel Title", "https://news.example.org/rss").as_deref(),
            Some("news.example.org")
        );
        assert_eq!(channel_label("", FEED).as_deref(), Some("example.com"));
        assert_eq!(channel_label("Three Word Title", "not a url").as_deref(), Some("Three Word Title"));
    }

    #[test]
    fn test_channel_label_counts_space_separated_words() {
        assert_eq!(channel_label("Tech  News", FEED).as_deref(), Some("Tech  News"));
        assert_eq!(channel_label("Tech\tDaily\tNews", FEED).as_deref(), Some("Tech\tDaily\tNews"));
        assert_eq!(channel_label("Tech Daily  News", FEED).as_deref(), Some("example.com"));
    }
}
