//! Session router: the per-thread state machine driving the store and the
//! inference client.
//!
//! A thread is either Unbound (no session) or Bound (session exists). A
//! bind event performs the only transition; message events self-loop on
//! Bound, running one append/invoke/persist exchange each.
//!
//! All operations on a given thread id are serialized through a per-thread
//! mutex, so concurrent events on the same thread see a consistent history
//! snapshot and their appends land in causal order. The user message is
//! persisted only after inference succeeds, so a failed call leaves no
//! orphaned user entry.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use threadbot_types::error::RouterError;
use threadbot_types::event::{BindEvent, MessageEvent, UserId};
use threadbot_types::message::Message;
use threadbot_types::session::{ConversationSession, ThreadId};

use crate::inference::{InferenceClient, generate_with_retry};
use crate::store::SessionStore;

/// Routes chat-platform events to sessions.
///
/// Generic over [`SessionStore`] and [`InferenceClient`] so the core stays
/// free of database and HTTP dependencies.
pub struct SessionRouter<S: SessionStore, I: InferenceClient> {
    store: S,
    pub(crate) inference: I,
    /// This bot's own user id, for mention stripping and self-author checks.
    bot_user: UserId,
    /// Per-thread locks serializing read -> infer -> append.
    locks: DashMap<ThreadId, Arc<Mutex<()>>>,
}

impl<S: SessionStore, I: InferenceClient> SessionRouter<S, I> {
    pub fn new(store: S, inference: I, bot_user: UserId) -> Self {
        Self {
            store,
            inference,
            bot_user,
            locks: DashMap::new(),
        }
    }

    /// Access the underlying store (read paths at the boundary).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Unbound -> Bound: bind a thread to a model.
    ///
    /// Duplicate binds surface [`StoreError::AlreadyExists`]; under correct
    /// routing the platform never re-binds an existing thread.
    ///
    /// [`StoreError::AlreadyExists`]: threadbot_types::error::StoreError::AlreadyExists
    pub async fn bind(&self, event: &BindEvent) -> Result<ConversationSession, RouterError> {
        let gate = self.lock_for(event.thread_id);
        let _guard = gate.lock().await;

        let session = self.store.create(event.thread_id, event.model).await?;
        info!(thread_id = %event.thread_id, model = %event.model, user = event.user.0, "session bound");
        Ok(session)
    }

    /// Self-loop on Bound: handle an inbound message event.
    ///
    /// Returns `Ok(None)` when the event should fall through to ordinary
    /// command processing: the author is a bot, this bot was not addressed,
    /// the content is empty, or the thread has no session.
    pub async fn handle_message(
        &self,
        event: &MessageEvent,
    ) -> Result<Option<String>, RouterError> {
        if event.author.is_bot || !event.mentions_bot || event.content.is_empty() {
            return Ok(None);
        }

        let text = strip_mentions(&event.content, self.bot_user);
        if text.is_empty() {
            return Ok(None);
        }

        let gate = self.lock_for(event.thread_id);
        let _guard = gate.lock().await;

        let Some(session) = self.store.get(event.thread_id).await? else {
            debug!(thread_id = %event.thread_id, "message in thread without session, delegating");
            return Ok(None);
        };

        let reply = self.run_exchange(session, text).await?;
        Ok(Some(reply))
    }

    /// One user/assistant exchange. Caller must hold the thread lock.
    ///
    /// Inference sees the stored history plus the candidate user message;
    /// both messages are appended only after inference succeeds.
    pub(crate) async fn run_exchange(
        &self,
        session: ConversationSession,
        user_text: String,
    ) -> Result<String, RouterError> {
        let thread_id = session.thread_id;
        let user_message = Message::user(user_text);

        let mut history = session.messages;
        history.push(user_message.clone());

        let reply = generate_with_retry(&self.inference, session.model, &history).await?;
        let reply_text = reply.content.clone();

        self.store.append_message(thread_id, user_message).await?;
        let updated = self.store.append_message(thread_id, reply).await?;
        info!(
            thread_id = %thread_id,
            model = %session.model,
            history_len = updated.message_count(),
            "exchange persisted"
        );

        Ok(reply_text)
    }

    pub(crate) fn lock_for(&self, thread_id: ThreadId) -> Arc<Mutex<()>> {
        self.locks.entry(thread_id).or_default().clone()
    }
}

/// Remove this bot's mention tokens (`<@id>` and `<@!id>`) from a message.
fn strip_mentions(content: &str, bot_user: UserId) -> String {
    let plain = format!("<@{}>", bot_user.0);
    let nick = format!("<@!{}>", bot_user.0);
    content.replace(&plain, "").replace(&nick, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemorySessionStore, MockInference};
    use threadbot_types::event::Author;
    use threadbot_types::message::MessageRole;
    use threadbot_types::model::ModelId;
    use threadbot_types::session::SYSTEM_PERSONA;

    const BOT: UserId = UserId(99);

    fn router(
        inference: MockInference,
    ) -> SessionRouter<MemorySessionStore, MockInference> {
        SessionRouter::new(MemorySessionStore::new(), inference, BOT)
    }

    fn bind_event(thread: u64, model: ModelId) -> BindEvent {
        BindEvent {
            thread_id: ThreadId(thread),
            model,
            user: UserId(12),
        }
    }

    fn message(thread: u64, content: &str) -> MessageEvent {
        MessageEvent {
            author: Author {
                id: UserId(12),
                is_bot: false,
            },
            mentions_bot: true,
            content: content.to_string(),
            thread_id: ThreadId(thread),
        }
    }

    #[tokio::test]
    async fn test_bind_creates_session_with_persona() {
        let router = router(MockInference::replying("sup"));
        let session = router
            .bind(&bind_event(1, ModelId::Llama2Fp16))
            .await
            .unwrap();

        assert_eq!(session.thread_id, ThreadId(1));
        assert_eq!(session.model, ModelId::Llama2Fp16);
        assert!(session.has_system_prefix());
        assert_eq!(session.messages[0].content, SYSTEM_PERSONA);
    }

    #[tokio::test]
    async fn test_duplicate_bind_rejected_and_first_session_kept() {
        let router = router(MockInference::replying("sup"));
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        let err = router
            .bind(&bind_event(1, ModelId::Mistral7bInstruct))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::Store(threadbot_types::error::StoreError::AlreadyExists)
        ));

        let kept = router.store().get(ThreadId(1)).await.unwrap().unwrap();
        assert_eq!(kept.model, ModelId::Llama2Fp16);
        assert_eq!(kept.message_count(), 1);
    }

    #[tokio::test]
    async fn test_exchange_appends_user_then_assistant() {
        // End-to-end scenario: bind, say "hello", mock replies "sup".
        let router = router(MockInference::replying("sup"));
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        let reply = router
            .handle_message(&message(1, "<@99> hello"))
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("sup"));

        let session = router.store().get(ThreadId(1)).await.unwrap().unwrap();
        let roles: Vec<_> = session.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
        assert_eq!(session.messages[1].content, "hello");
        assert_eq!(session.messages[2].content, "sup");
    }

    #[tokio::test]
    async fn test_inference_sees_full_history_including_candidate() {
        let router = router(MockInference::replying("ok"));
        router.bind(&bind_event(1, ModelId::Llama2Int8)).await.unwrap();

        router.handle_message(&message(1, "<@99> first")).await.unwrap();
        router.handle_message(&message(1, "<@99> second")).await.unwrap();

        let histories = router.inference.histories();
        assert_eq!(histories.len(), 2);
        // First call: persona + candidate user message.
        assert_eq!(histories[0].len(), 2);
        // Second call: persona + first exchange + new candidate.
        assert_eq!(histories[1].len(), 4);
        assert_eq!(histories[1][3].content, "second");
    }

    #[tokio::test]
    async fn test_history_alternates_after_n_exchanges() {
        let router = router(MockInference::replying("ok"));
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        let n = 4;
        for i in 0..n {
            router
                .handle_message(&message(1, &format!("<@99> msg {i}")))
                .await
                .unwrap();
        }

        let session = router.store().get(ThreadId(1)).await.unwrap().unwrap();
        assert_eq!(session.message_count(), 1 + 2 * n);
        assert_eq!(session.messages[0].role, MessageRole::System);
        for (i, msg) in session.messages[1..].iter().enumerate() {
            let expected = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            assert_eq!(msg.role, expected, "message {} out of order", i + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_inference_leaves_history_untouched() {
        // End-to-end scenario: unreachable service, no orphaned user entry.
        let router = router(MockInference::always_fail());
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        let err = router
            .handle_message(&message(1, "<@99> hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Inference(_)));

        let session = router.store().get(ThreadId(1)).await.unwrap().unwrap();
        assert_eq!(session.message_count(), 1);
        assert_eq!(session.messages[0].role, MessageRole::System);
    }

    #[tokio::test]
    async fn test_delegates_bot_author() {
        let router = router(MockInference::replying("sup"));
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        let mut event = message(1, "<@99> hello");
        event.author.is_bot = true;
        assert!(router.handle_message(&event).await.unwrap().is_none());
        assert_eq!(router.inference.calls(), 0);
    }

    #[tokio::test]
    async fn test_delegates_when_not_mentioned() {
        let router = router(MockInference::replying("sup"));
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        let mut event = message(1, "hello");
        event.mentions_bot = false;
        assert!(router.handle_message(&event).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delegates_empty_content() {
        let router = router(MockInference::replying("sup"));
        router.bind(&bind_event(1, ModelId::Llama2Fp16)).await.unwrap();

        assert!(router.handle_message(&message(1, "")).await.unwrap().is_none());
        // Mention-only message strips down to nothing.
        assert!(
            router
                .handle_message(&message(1, "<@99>"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delegates_thread_without_session() {
        let router = router(MockInference::replying("sup"));
        // No bind for thread 5.
        assert!(
            router
                .handle_message(&message(5, "<@99> hello"))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(router.inference.calls(), 0);
    }

    #[test]
    fn test_strip_mentions() {
        assert_eq!(strip_mentions("<@99> hello", BOT), "hello");
        assert_eq!(strip_mentions("hello <@!99> there", BOT), "hello  there");
        assert_eq!(strip_mentions("<@42> hi", BOT), "<@42> hi");
        assert_eq!(strip_mentions("<@99>", BOT), "");
    }
}
