// Per-conversation message store with optimistic updates.
//
// Submits append the user's message and a loading placeholder before any
// network round-trip; reconciliation sweeps the placeholders and appends the
// real response. Within a conversation, order is insertion order — nothing is
// ever reordered or deduplicated beyond placeholder removal.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::message::{ResponseMessage, Speaker};

/// Attachment carried on a user message. Stored, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub content_type: String,
    pub title: String,
}

/// One cached chat entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub text: String,
    pub user: Speaker,
    pub created_at: i64,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("a submit is already in flight for conversation {0}")]
    SubmitInFlight(String),
}

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Ordered message lists keyed by conversation id.
///
/// Mutated only by the submit path and the reconciliation path; both run on
/// the caller's single thread, so no lock is held here. A second submit while
/// one is outstanding for the same conversation is rejected.
pub struct ConversationCache {
    conversations: HashMap<String, Vec<ConversationMessage>>,
    in_flight: HashSet<String>,
    clock: Clock,
}

impl Default for ConversationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationCache {
    pub fn new() -> Self {
        Self::with_clock(Box::new(|| Utc::now().timestamp_millis()))
    }

    /// Build with an injected clock so tests control timestamps.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            conversations: HashMap::new(),
            in_flight: HashSet::new(),
            clock,
        }
    }

    pub fn messages(&self, conversation_id: &str) -> &[ConversationMessage] {
        self.conversations
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_in_flight(&self, conversation_id: &str) -> bool {
        self.in_flight.contains(conversation_id)
    }

    /// Optimistically append the user's message and a loading placeholder.
    pub fn submit(
        &mut self,
        conversation_id: &str,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> Result<(), CacheError> {
        if self.in_flight.contains(conversation_id) {
            return Err(CacheError::SubmitInFlight(conversation_id.to_string()));
        }

        let now = (self.clock)();
        let messages = self.conversations.entry(conversation_id.to_string()).or_default();
        messages.push(ConversationMessage {
            text: text.to_string(),
            user: Speaker::User,
            created_at: now,
            is_loading: false,
            metadata: None,
            attachments,
        });
        messages.push(ConversationMessage {
            text: text.to_string(),
            user: Speaker::System,
            created_at: now,
            is_loading: true,
            metadata: None,
            attachments: Vec::new(),
        });

        self.in_flight.insert(conversation_id.to_string());
        debug!(conversation_id, "optimistic entries appended");
        Ok(())
    }

    /// Sweep the conversation's placeholders and append the response
    /// messages with a fresh timestamp.
    pub fn reconcile(&mut self, conversation_id: &str, responses: Vec<ResponseMessage>) {
        let now = (self.clock)();
        let messages = self.conversations.entry(conversation_id.to_string()).or_default();
        messages.retain(|message| !message.is_loading);
        for response in responses {
            let metadata = response
                .metadata
                .as_ref()
                .and_then(|instruction| serde_json::to_value(instruction).ok());
            messages.push(ConversationMessage {
                text: response.text,
                user: Speaker::System,
                created_at: now,
                is_loading: false,
                metadata,
                attachments: Vec::new(),
            });
        }
        self.in_flight.remove(conversation_id);
        debug!(conversation_id, "conversation reconciled");
    }

    /// Drop the conversation's placeholders after a failed submit so the
    /// next submit is not locked out.
    pub fn abort(&mut self, conversation_id: &str) {
        if let Some(messages) = self.conversations.get_mut(conversation_id) {
            messages.retain(|message| !message.is_loading);
        }
        self.in_flight.remove(conversation_id);
        debug!(conversation_id, "in-flight submit aborted");
    }
}
