//! Conversation session: the persisted binding of a chat thread to a model
//! and its accumulated message history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::message::{Message, MessageRole};
use crate::model::ModelId;

/// Persona injected as the first message of every session.
pub const SYSTEM_PERSONA: &str =
    "You are a Discord Bot. Be rude, don't speak so formally. Speak with slang.";

/// Opaque identifier of a chat thread (platform snowflake).
///
/// One session exists per thread at any time; the thread id is the
/// session's storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ThreadId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(ThreadId)
    }
}

/// A conversation session.
///
/// `thread_id` and `model` are fixed at creation. `messages` is append-only
/// and insertion-ordered; the first entry is always the system persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub thread_id: ThreadId,
    pub model: ModelId,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Creates a new session seeded with the system persona message.
    pub fn new(thread_id: ThreadId, model: ModelId) -> Self {
        Self {
            thread_id,
            model,
            messages: vec![Message::system(SYSTEM_PERSONA)],
            created_at: Utc::now(),
        }
    }

    /// Number of messages, including the system persona.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// The last message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True when the history starts with a system-role message.
    pub fn has_system_prefix(&self) -> bool {
        self.messages
            .first()
            .is_some_and(|m| m.role == MessageRole::System)
    }
}
