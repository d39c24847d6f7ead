//! Remote article extraction through a Diffbot-style API.
//!
//! The API is called as `GET {endpoint}?token={token}&url={article url}` and
//! answers with a JSON object holding an `objects` array of extracted
//! articles. Only the first article's `text` is used.

use super::ContentError;
use crate::utils::truncate_content;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    #[serde(default)]
    objects: Vec<ExtractedArticle>,
}

#[derive(Debug, Deserialize)]
struct ExtractedArticle {
    #[serde(default)]
    text: String,
}

/// Build the request URL for `link`.
pub fn request_url(endpoint: &str, token: &str, link: &str) -> String {
    format!(
        "{}?token={}&url={}",
        endpoint,
        urlencoding::encode(token),
        urlencoding::encode(link)
    )
}

/// Extract the article behind `link`, truncated to `max_length` characters.
#[instrument(level = "debug", skip(client, token))]
pub async fn extract(
    client: &reqwest::Client,
    endpoint: &str,
    token: &str,
    link: &str,
    max_length: usize,
) -> Result<String, ContentError> {
    let response = client.get(request_url(endpoint, token, link)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ContentError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    let parsed: ExtractionResponse = serde_json::from_str(&body)?;
    let text = parsed
        .objects
        .into_iter()
        .next()
        .map(|article| article.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or(ContentError::Empty)?;

    debug!(chars = text.chars().count(), "Remote extraction returned text");
    Ok(truncate_content(&text, max_length))
}
