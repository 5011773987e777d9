//! SessionStore trait definition.
//!
//! Persistence of conversation records keyed by thread id. The store is the
//! single shared mutable resource: all history mutation goes through
//! `create` and `append_message`, preserving the append-only invariant.
//!
//! Implementations live in threadbot-infra (e.g., `SqliteSessionStore`).
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).

use threadbot_types::error::StoreError;
use threadbot_types::message::Message;
use threadbot_types::model::ModelId;
use threadbot_types::session::{ConversationSession, ThreadId};

/// Repository trait for conversation session persistence.
pub trait SessionStore: Send + Sync {
    /// Create a session for a thread, seeding the system persona message.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if the thread already has a
    /// session; the existing session is left unmodified.
    fn create(
        &self,
        thread_id: ThreadId,
        model: ModelId,
    ) -> impl std::future::Future<Output = Result<ConversationSession, StoreError>> + Send;

    /// Get the session for a thread, if one exists.
    fn get(
        &self,
        thread_id: ThreadId,
    ) -> impl std::future::Future<Output = Result<Option<ConversationSession>, StoreError>> + Send;

    /// Atomically append one message to the end of a session's history and
    /// return the updated session.
    ///
    /// Fails with [`StoreError::NotFound`] if the thread has no session.
    fn append_message(
        &self,
        thread_id: ThreadId,
        message: Message,
    ) -> impl std::future::Future<Output = Result<ConversationSession, StoreError>> + Send;
}
