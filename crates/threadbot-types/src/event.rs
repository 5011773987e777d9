//! Chat-platform boundary events consumed by the session router.
//!
//! These are the typed shapes of the three inbound actions the platform
//! delivers: a live message in a thread, a model-selection bind, and a
//! regenerate command referencing a previously displayed message.

use serde::{Deserialize, Serialize};

use crate::model::ModelId;
use crate::session::ThreadId;

/// Identifier of a platform user (snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Author of a platform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    /// True when the author is a bot account (including this bot).
    pub is_bot: bool,
}

/// An inbound message event in a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub author: Author,
    /// Whether this bot was addressed (mentioned) in the message.
    pub mentions_bot: bool,
    pub content: String,
    pub thread_id: ThreadId,
}

/// A model-selection action binding a thread to a model.
///
/// Thread creation happens at the platform boundary before this event is
/// dispatched; the router only records the binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindEvent {
    pub thread_id: ThreadId,
    pub model: ModelId,
    /// The user who selected the model.
    pub user: UserId,
}

/// The message a regenerate command points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMessage {
    pub author: Author,
    pub content: String,
}

/// A command to re-run inference for a previously answered user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateCommand {
    pub thread_id: ThreadId,
    pub target: TargetMessage,
}
