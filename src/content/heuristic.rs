//! Local main-content extraction from a fetched article page.
//!
//! Page chrome (`script`, `style`, `nav`, `footer`, `header`) is dropped with
//! everything inside it. Of what remains, all `<article>` elements are
//! preferred, then the first `<main>`, then the whole document.

use super::ContentError;
use crate::utils::{collapse_whitespace, truncate_content};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// Elements removed together with their content.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header"];

static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("static selector"));
static MAIN_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("main").expect("static selector"));

/// Fetch `link` and extract its main text, truncated to `max_length` characters.
#[instrument(level = "debug", skip(client))]
pub async fn extract(
    client: &reqwest::Client,
    link: &str,
    max_length: usize,
) -> Result<String, ContentError> {
    let response = client.get(link).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ContentError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    let text = main_text(&body, max_length);
    debug!(bytes = body.len(), chars = text.chars().count(), "Parsed article page");
    if text.is_empty() {
        return Err(ContentError::Empty);
    }
    Ok(text)
}

/// Pick the main text out of an HTML page.
pub fn main_text(html: &str, max_length: usize) -> String {
    let document = Html::parse_document(html);

    let articles: Vec<String> = document
        .select(&ARTICLE_SELECTOR)
        .filter(|el| !inside_stripped(*el) && !inside_article(*el))
        .map(visible_text)
        .collect();

    let raw = if !articles.is_empty() {
        articles.join(" ")
    } else if let Some(main) = document
        .select(&MAIN_SELECTOR)
        .find(|el| !inside_stripped(*el))
    {
        visible_text(main)
    } else {
        visible_text(document.root_element())
    };

    truncate_content(&collapse_whitespace(&raw), max_length)
}

fn is_stripped(name: &str) -> bool {
    STRIPPED_ELEMENTS.contains(&name)
}

fn inside_stripped(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_stripped(ancestor.value().name()))
}

/// Nested articles are already covered by their outermost ancestor.
fn inside_article(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "article")
}

/// Concatenated text under `element`, skipping stripped subtrees.
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_stripped(ancestor.value().name()));
        if !hidden {
            out.push_str(text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_removes_scripts() {
        let html = "<html><body><p>Content</p><script>alert('test');</script></body></html>";
        assert_eq!(main_text(html, 2000), "Content");
    }

    #[test]
    fn test_removes_styles() {
        let html =
            "<html><head><style>body { color: red; }</style></head><body><p>Text</p></body></html>";
        assert_eq!(main_text(html, 2000), "Text");
    }

    #[test]
    fn test_prefers_article_content() {
        let html = "<html><body><nav>Navigation</nav><article>Article content here</article><footer>Footer</footer></body></html>";
        assert_eq!(main_text(html, 2000), "Article content here");
    }

    #[test]
    fn test_joins_every_article() {
        let html = "<html><body><article>First</article><div>Noise</div><article>Second</article></body></html>";
        assert_eq!(main_text(html, 2000), "First Second");
    }

    #[test]
    fn test_nested_articles_are_not_repeated() {
        let html = "<html><body><article>Outer <article>Inner</article></article></body></html>";
        assert_eq!(main_text(html, 2000), "Outer Inner");
    }

    #[test]
    fn test_falls_back_to_main() {
        let html = "<html><body><header>Header</header><main>Main content</main><footer>Footer</footer></body></html>";
        assert_eq!(main_text(html, 2000), "Main content");
    }

    #[test]
    fn test_collapses_whitespace_and_nested_tags() {
        let html = "<html><body><main>\n  <p>Hello <b>world</b>!</p>\n\n  <p>Again</p></main></body></html>";
        assert_eq!(main_text(html, 2000), "Hello world! Again");
    }

    #[test]
    fn test_truncates_long_content() {
        let html = format!("<html><body><p>{}</p></body></html>", "a".repeat(1100));
        let text = main_text(&html, 1000);
        assert_eq!(text.chars().count(), 1003);
        assert!(text.ends_with("..."));
    }

    #[tokio::test]
    async fn test_extract_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = extract(&reqwest::Client::new(), &format!("{}/missing", server.uri()), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::HttpStatus(404)));
    }

    #[tokio::test]
    async fn test_extract_network_error() {
        // Nothing listens on port 9 locally.
        let err = extract(&reqwest::Client::new(), "http://127.0.0.1:9/article", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Network(_)));
    }
}
