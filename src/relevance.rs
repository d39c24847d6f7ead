//! Optional topic filter backed by an LLM.
//!
//! When the operator passes `--topic`, each entry's content is sent to the
//! reasoning service together with the embedded prompt template. The reply is
//! read by its first line prefix:
//!
//! - `NOT_RELEVANT` drops the entry
//! - `RELEVANT: <text>` keeps it and swaps its content for `<text>`
//! - anything else keeps the entry unchanged
//!
//! The filter fails open. A missing key, an unreachable service or a reply in
//! the wrong shape never drops news.

use crate::api::{AskAsync, ChatClient, RetryAsk};
use crate::config::Config;
use crate::utils::truncate_for_log;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/relevance_filter.yaml");
const TOPIC_PLACEHOLDER: &str = "{{topic}}";
const CONTENT_PLACEHOLDER: &str = "{{content}}";

/// Problems with a prompt template. Fatal at startup.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid template YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("template prompt is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),
    #[error("template does not name a model")]
    MissingModel,
}

/// Prompt template for the relevance check.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    pub prompt: String,
}

impl PromptTemplate {
    /// The template compiled into the binary.
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::from_yaml(EMBEDDED_TEMPLATE)
    }

    pub fn from_yaml(source: &str) -> Result<Self, TemplateError> {
        let template: Self = serde_yaml::from_str(source)?;
        if template.model.trim().is_empty() {
            return Err(TemplateError::MissingModel);
        }
        for placeholder in [TOPIC_PLACEHOLDER, CONTENT_PLACEHOLDER] {
            if !template.prompt.contains(placeholder) {
                return Err(TemplateError::MissingPlaceholder(placeholder));
            }
        }
        Ok(template)
    }

    pub fn render(&self, topic: &str, content: &str) -> String {
        self.prompt
            .replace(TOPIC_PLACEHOLDER, topic)
            .replace(CONTENT_PLACEHOLDER, content)
    }
}

/// Outcome of the relevance check for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Off topic: emit nothing.
    Suppress,
    /// On topic: emit this text as the content.
    Replace(String),
    /// Unknown: emit the entry unfiltered.
    Keep,
}

/// Classify a reply from the reasoning service.
pub fn classify(reply: &str) -> Verdict {
    let reply = reply.trim();
    if reply.starts_with("NOT_RELEVANT") {
        return Verdict::Suppress;
    }
    match reply.strip_prefix("RELEVANT:") {
        Some(rest) if !rest.trim().is_empty() => Verdict::Replace(rest.trim().to_string()),
        _ => Verdict::Keep,
    }
}

/// Asks the reasoning service whether content matches the configured topic.
#[derive(Debug)]
pub struct RelevanceFilter<A = RetryAsk<ChatClient>> {
    topic: String,
    template: PromptTemplate,
    asker: A,
}

impl RelevanceFilter {
    /// Build the filter from configuration.
    ///
    /// Returns `None` when no topic is set, or when no API key is available,
    /// in which case every entry passes through unfiltered.
    pub fn from_config(
        client: reqwest::Client,
        config: &Config,
        template: PromptTemplate,
    ) -> Option<Self> {
        let topic = config.topic.clone()?;
        let Some(api_key) = config.reasoning_key.clone() else {
            warn!(%topic, "Topic filter requested but no OpenAI API key is set; entries pass unfiltered");
            return None;
        };
        let chat = ChatClient::new(
            client,
            config.reasoning_endpoint.clone(),
            api_key,
            template.model.clone(),
            template.temperature,
        );
        let asker = RetryAsk::new(chat, 2, Duration::from_secs(1));
        Some(Self::with_asker(topic, template, asker))
    }
}

impl<A> RelevanceFilter<A>
where
    A: AskAsync<Response = String>,
{
    pub fn with_asker(topic: String, template: PromptTemplate, asker: A) -> Self {
        Self {
            topic,
            template,
            asker,
        }
    }

    /// Judge `content` against the topic. Never fails; errors keep the entry.
    #[instrument(level = "debug", skip_all, fields(topic = %self.topic))]
    pub async fn evaluate(&self, content: &str) -> Verdict {
        if content.trim().is_empty() {
            return Verdict::Keep;
        }

        let prompt = self.template.render(&self.topic, content);
        match self.asker.ask(&prompt).await {
            Ok(reply) => {
                let verdict = classify(&reply);
                if verdict == Verdict::Keep {
                    warn!(
                        reply = %truncate_for_log(&reply, 120),
                        "Unexpected relevance reply; keeping entry unfiltered"
                    );
                } else {
                    debug!(?verdict, "Relevance verdict");
                }
                verdict
            }
            Err(e) => {
                warn!(error = %e, "Relevance check failed; keeping entry unfiltered");
                Verdict::Keep
            }
        }
    }
}
