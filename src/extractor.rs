// Intent extraction through an external generative call.
//
// The extractor is an untyped oracle: it produces a candidate object for one
// action kind, and nothing downstream trusts it beyond what the content
// validators check.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::message::ConversationContext;

/// Slot in a task template that receives the rendered conversation context.
pub const RECENT_MESSAGES_SLOT: &str = "{{recentMessages}}";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("extraction response was not usable: {0}")]
    MalformedResponse(String),
}

/// Maps (conversation context, task template) to a candidate object.
///
/// Pure from the caller's point of view, non-deterministic in practice.
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    async fn extract(
        &self,
        context: &ConversationContext,
        template: &str,
    ) -> Result<serde_json::Value, ExtractionError>;
}

/// Extractor backed by an OpenAI-style chat-completions endpoint.
pub struct ModelIntentExtractor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ModelIntentExtractor {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }
}

#[async_trait]
impl IntentExtractor for ModelIntentExtractor {
    async fn extract(
        &self,
        context: &ConversationContext,
        template: &str,
    ) -> Result<serde_json::Value, ExtractionError> {
        let prompt = compose_prompt(template, context);
        debug!(
            conversation_id = context.conversation_id(),
            model = %self.model,
            "requesting extraction"
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let mut call = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }
        let response: ChatResponse = call
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| ExtractionError::MalformedResponse("no choices returned".to_string()))?;

        parse_object_block(text)
    }
}

/// Fill a task template's `{{recentMessages}}` slot with the rendered context.
pub fn compose_prompt(template: &str, context: &ConversationContext) -> String {
    template.replace(RECENT_MESSAGES_SLOT, &context.render_recent())
}

/// Pull the JSON object out of a model response.
///
/// Models asked for "a JSON markdown block" answer with a ```json fence, a
/// bare object, or an object buried in prose; all three are accepted.
pub fn parse_object_block(text: &str) -> Result<serde_json::Value, ExtractionError> {
    let trimmed = text.trim();

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(unfenced) {
        if value.is_object() {
            return Ok(value);
        }
    }

    let start = unfenced.find('{');
    let end = unfenced.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&unfenced[start..=end]) {
                if value.is_object() {
                    return Ok(value);
                }
            }
        }
    }

    Err(ExtractionError::MalformedResponse(format!(
        "no JSON object found in response: {trimmed:?}"
    )))
}
