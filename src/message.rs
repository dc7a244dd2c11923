// Boundary types shared by the action handlers and the chat client.

use serde::{Deserialize, Serialize};

use crate::github::types::PullRequestSummary;

/// Who authored a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    System,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::User => write!(f, "user"),
            Speaker::System => write!(f, "system"),
        }
    }
}

/// One remembered turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// Recent-message context for one conversation.
///
/// Created per conversation, updated after every turn, never shared across
/// conversations. The extractor renders it into the `{{recentMessages}}` slot
/// of a task template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    conversation_id: String,
    turns: Vec<ContextTurn>,
    capacity: usize,
}

impl ConversationContext {
    const DEFAULT_CAPACITY: usize = 10;

    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            turns: Vec::new(),
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(ContextTurn {
            speaker,
            text: text.into(),
        });
        if self.turns.len() > self.capacity {
            let excess = self.turns.len() - self.capacity;
            self.turns.drain(..excess);
        }
    }

    pub fn turns(&self) -> &[ContextTurn] {
        &self.turns
    }

    /// Render the remembered turns as `speaker: text` lines for a template.
    pub fn render_recent(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.speaker, turn.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One user submission, immutable once created.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    conversation_id: String,
    text: String,
    context: ConversationContext,
}

impl ActionRequest {
    pub fn new(text: impl Into<String>, context: &ConversationContext) -> Self {
        Self {
            conversation_id: context.conversation_id().to_string(),
            text: text.into(),
            context: context.clone(),
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }
}

/// Recipient and amount of a token transfer owed for a merged pull request.
///
/// Attached to a response message's metadata by the merge handler and
/// consumed exactly once by the client-side settlement executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardInstruction {
    pub recipient: String,
    pub amount: String,
}

impl RewardInstruction {
    /// Strict parse of the metadata protocol: an object holding exactly
    /// `recipient` (string) and `amount`. A bare JSON number for `amount` is
    /// normalized to its decimal string; any other shape is no reward.
    pub fn from_metadata(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 2 {
            return None;
        }
        let recipient = object.get("recipient")?.as_str()?.to_string();
        let amount = match object.get("amount")? {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Number(number) => number.to_string(),
            _ => return None,
        };
        Some(Self { recipient, amount })
    }
}

/// Operation result carried alongside a response's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseContent {
    MergeResult { sha: String, message: String },
    IssueCreated { url: String },
    CommentPosted { url: String },
    PullRequests { pulls: Vec<PullRequestSummary> },
    Error { message: String },
}

/// One response per orchestration pass, sent across the process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub text: String,
    pub content: ResponseContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RewardInstruction>,
}

impl ResponseMessage {
    pub fn plain(text: impl Into<String>, content: ResponseContent) -> Self {
        Self {
            text: text.into(),
            content,
            metadata: None,
        }
    }

    pub fn with_metadata(
        text: impl Into<String>,
        content: ResponseContent,
        metadata: RewardInstruction,
    ) -> Self {
        Self {
            text: text.into(),
            content,
            metadata: Some(metadata),
        }
    }

    pub fn error(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            content: ResponseContent::Error {
                message: message.into(),
            },
            metadata: None,
        }
    }
}
