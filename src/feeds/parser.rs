//! RSS document parsing.
//!
//! Parsing happens in two passes. The first pass reads only the XML
//! declaration to learn the document's declared encoding; the bytes are then
//! normalized to UTF-8 by [`super::charset::normalize`] and the second pass
//! walks the decoded text with a `quick-xml` event reader.
//!
//! The reader is lenient about content and strict about structure: missing
//! fields just stay empty, but unbalanced or unparseable markup fails the
//! whole document.

use super::{FeedError, charset};
use crate::models::{Channel, Feed, Item};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::borrow::Cow;

/// The item and channel fields the parser keeps.
#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Description,
    PubDate,
    Guid,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" => Some(Field::Description),
            b"pubDate" => Some(Field::PubDate),
            b"guid" => Some(Field::Guid),
            _ => None,
        }
    }
}

/// Which record a captured field belongs to.
#[derive(Debug, Clone, Copy)]
enum Target {
    Channel(Field),
    Item(Field),
}

/// Read the `encoding` attribute of the XML declaration, if there is one.
fn declared_encoding(bytes: &[u8]) -> Result<String, FeedError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Decl(decl)) => {
                return match decl.encoding() {
                    Some(Ok(label)) => Ok(String::from_utf8_lossy(&label).into_owned()),
                    Some(Err(e)) => Err(FeedError::MalformedDocument(e.to_string())),
                    None => Ok(String::new()),
                };
            }
            // Whitespace or a comment may precede the root; keep looking.
            Ok(Event::Text(_)) | Ok(Event::Comment(_)) => {}
            Ok(_) => return Ok(String::new()),
            Err(e) => return Err(FeedError::MalformedDocument(e.to_string())),
        }
        buf.clear();
    }
}

/// Parse raw feed bytes into a [`Feed`].
///
/// # Errors
///
/// - [`FeedError::UnsupportedCharset`] when the declared encoding is not on the allow-list
/// - [`FeedError::MalformedDocument`] when the markup cannot be parsed
pub fn parse_feed(bytes: &[u8]) -> Result<Feed, FeedError> {
    let label = declared_encoding(bytes)?;
    let text = charset::normalize(&label, bytes)?;
    parse_text(&text)
}

fn parse_text(text: &str) -> Result<Feed, FeedError> {
    let mut reader = Reader::from_str(text);

    let mut channel = Channel::default();
    let mut current_item: Option<Item> = None;
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut capture: Option<(Target, usize)> = None;
    let mut value = String::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_root = true;
                let name = e.name().as_ref().to_vec();
                if capture.is_none() {
                    let parent = path.last().map(Vec::as_slice);
                    if name == b"item" {
                        current_item = Some(Item::default());
                    } else if let Some(field) = Field::from_name(&name) {
                        let target = match parent {
                            Some(b"item") if current_item.is_some() => Some(Target::Item(field)),
                            Some(b"channel") => Some(Target::Channel(field)),
                            _ => None,
                        };
                        if let Some(target) = target {
                            capture = Some((target, path.len()));
                            value.clear();
                        }
                    }
                }
                path.push(name);
            }
            Ok(Event::End(e)) => {
                path.pop();
                match capture {
                    Some((target, depth)) if depth == path.len() => {
                        assign(target, value.trim(), &mut channel, current_item.as_mut());
                        capture = None;
                    }
                    Some(_) => {}
                    None if e.name().as_ref() == b"item" => {
                        if let Some(item) = current_item.take() {
                            channel.items.push(item);
                        }
                    }
                    None => {}
                }
            }
            Ok(Event::Empty(_)) => saw_root = true,
            Ok(Event::Text(e)) => {
                if capture.is_some() {
                    value.push_str(&unescape_lossy(&String::from_utf8_lossy(&e)));
                }
            }
            Ok(Event::CData(e)) => {
                if capture.is_some() {
                    value.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::GeneralRef(r)) => {
                if capture.is_some() {
                    let reference = format!("&{};", String::from_utf8_lossy(&r));
                    value.push_str(&unescape_lossy(&reference));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(FeedError::MalformedDocument(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if !saw_root {
        return Err(FeedError::MalformedDocument("no root element".to_string()));
    }
    if let Some(open) = path.last() {
        return Err(FeedError::MalformedDocument(format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(open)
        )));
    }

    Ok(Feed { channel })
}

/// Resolve entity and character references, keeping the raw text when a
/// reference is unknown.
fn unescape_lossy(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

fn assign(target: Target, value: &str, channel: &mut Channel, item: Option<&mut Item>) {
    let value = value.to_string();
    match target {
        Target::Channel(field) => match field {
            Field::Title => channel.title = value,
            Field::Link => channel.link = value,
            Field::Description => channel.description = value,
            Field::PubDate | Field::Guid => {}
        },
        Target::Item(field) => {
            let Some(item) = item else { return };
            match field {
                Field::Title => item.title = value,
                Field::Link => item.link = value,
                Field::Description => item.description = value,
                Field::PubDate => item.pub_date = value,
                Field::Guid => item.guid = value,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1251;

    const VALID_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
	<channel>
		<title>Test Feed</title>
		<link>https://example.com</link>
		<description>Test Description</description>
		<item>
			<title>Test Item</title>
			<link>https://example.com/item1</link>
			<description>Item Description</description>
			<pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
			<guid>unique-guid-1</guid>
		</item>
	</channel>
</rss>"#;

    #[test]
    fn test_parse_valid_rss() {
        let feed = parse_feed(VALID_RSS.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "Test Feed");
        assert_eq!(feed.channel.link, "https://example.com");
        assert_eq!(feed.channel.description, "Test Description");
        assert_eq!(feed.channel.items.len(), 1);

        let item = &feed.channel.items[0];
        assert_eq!(item.title, "Test Item");
        assert_eq!(item.link, "https://example.com/item1");
        assert_eq!(item.description, "Item Description");
        assert_eq!(item.pub_date, "Mon, 01 Jan 2024 00:00:00 GMT");
        assert_eq!(item.guid, "unique-guid-1");
    }

    #[test]
    fn test_invalid_xml_is_rejected() {
        let err = parse_feed(b"not valid xml").unwrap_err();
        assert!(matches!(err, FeedError::MalformedDocument(_)));
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        let xml = "<rss><channel><title>x</channel></rss>";
        assert!(matches!(
            parse_feed(xml.as_bytes()),
            Err(FeedError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_unclosed_document_is_rejected() {
        let xml = "<rss><channel><title>x</title>";
        assert!(matches!(
            parse_feed(xml.as_bytes()),
            Err(FeedError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_empty_channel_is_valid() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Empty Feed</title><description>No items</description></channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "Empty Feed");
        assert!(feed.channel.items.is_empty());
    }

    #[test]
    fn test_items_keep_document_order() {
        let xml = r#"<rss><channel><title>Multi</title>
            <item><title>Item 1</title><guid>guid-1</guid></item>
            <item><title>Item 2</title><guid>guid-2</guid></item>
            <item><title>Item 3</title><guid>guid-3</guid></item>
        </channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        let titles: Vec<_> = feed.channel.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Item 1", "Item 2", "Item 3"]);
    }

    #[test]
    fn test_missing_fields_do_not_invalidate_items() {
        let xml = r#"<rss><channel><title>Feed</title>
            <item><title>Good Item</title><link>https://example.com/good</link></item>
            <item><title></title><link></link></item>
            <item><description>only a description</description></item>
        </channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.channel.items.len(), 3);
        assert_eq!(feed.channel.items[1].link, "");
        assert_eq!(feed.channel.items[2].title, "");
        assert_eq!(feed.channel.items[2].description, "only a description");
    }

    #[test]
    fn test_entities_cdata_and_guid_attributes() {
        let xml = r#"<rss><channel><title>Tom &amp; Jerry &#169;</title>
            <item>
                <title><![CDATA[<b>Bold</b> news]]></title>
                <description>&lt;p&gt;Hello&lt;/p&gt;</description>
                <guid isPermaLink="false">abc-123</guid>
            </item>
        </channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "Tom & Jerry ©");
        let item = &feed.channel.items[0];
        assert_eq!(item.title, "<b>Bold</b> news");
        assert_eq!(item.description, "<p>Hello</p>");
        assert_eq!(item.guid, "abc-123");
    }

    #[test]
    fn test_nested_elements_do_not_leak_into_channel() {
        let xml = r#"<rss xmlns:atom="http://www.w3.org/2005/Atom"><channel>
            <title>Real Title</title>
            <atom:link href="https://example.com/rss" rel="self"/>
            <image><title>Logo Title</title><link>https://example.com/logo.png</link></image>
            <link>https://example.com</link>
        </channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "Real Title");
        assert_eq!(feed.channel.link, "https://example.com");
    }

    #[test]
    fn test_non_ascii_utf8() {
        let xml = "<rss><channel><title>中文 🎉</title></channel></rss>";
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.channel.title, "中文 🎉");
    }

    #[test]
    fn test_windows_1251_document() {
        let original = "Тест на русском языке";
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"windows-1251\"?>\n<rss version=\"2.0\"><channel><title>{original}</title><item><title>{original}</title><link>https://example.com/item</link></item></channel></rss>"
        );
        let (encoded, _, _) = WINDOWS_1251.encode(&xml);
        let feed = parse_feed(&encoded).unwrap();
        assert_eq!(feed.channel.title, original);
        assert_eq!(feed.channel.items.len(), 1);
        assert_eq!(feed.channel.items[0].title, original);
    }

    #[test]
    fn test_iso_8859_1_document() {
        let mut xml = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><rss><channel><title>Caf".to_vec();
        xml.push(0xe9);
        xml.extend_from_slice(b" fran\xe7ais</title></channel></rss>");
        let feed = parse_feed(&xml).unwrap();
        assert_eq!(feed.channel.title, "Café français");
    }

    #[test]
    fn test_latin1_bytes_in_utf8_document_are_rejected() {
        let declared = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss><channel><title>Caf\xe9</title></channel></rss>";
        assert!(matches!(
            parse_feed(declared),
            Err(FeedError::MalformedDocument(_))
        ));

        let undeclared = b"<rss><channel><title>Caf\xe9</title></channel></rss>";
        assert!(matches!(
            parse_feed(undeclared),
            Err(FeedError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_unsupported_declared_charset() {
        let xml = r#"<?xml version="1.0" encoding="unsupported-encoding"?>
<rss version="2.0"><channel><title>Test</title></channel></rss>"#;
        let err = parse_feed(xml.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unsupported charset"));
    }
}
