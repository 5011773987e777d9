//! In-memory test doubles for the store and inference ports.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use threadbot_types::error::{InferenceError, StoreError};
use threadbot_types::message::Message;
use threadbot_types::model::ModelId;
use threadbot_types::session::{ConversationSession, ThreadId};

use crate::inference::InferenceClient;
use crate::store::SessionStore;

/// HashMap-backed [`SessionStore`] for router tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<ThreadId, ConversationSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(
        &self,
        thread_id: ThreadId,
        model: ModelId,
    ) -> Result<ConversationSession, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(&thread_id) {
            return Err(StoreError::AlreadyExists);
        }
        let session = ConversationSession::new(thread_id, model);
        sessions.insert(thread_id, session.clone());
        Ok(session)
    }

    async fn get(&self, thread_id: ThreadId) -> Result<Option<ConversationSession>, StoreError> {
        Ok(self.sessions.lock().unwrap().get(&thread_id).cloned())
    }

    async fn append_message(
        &self,
        thread_id: ThreadId,
        message: Message,
    ) -> Result<ConversationSession, StoreError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(&thread_id).ok_or(StoreError::NotFound)?;
        session.messages.push(message);
        Ok(session.clone())
    }
}

/// Scripted [`InferenceClient`] that replays a fixed sequence of results and
/// records the histories it was called with.
pub struct MockInference {
    script: Mutex<VecDeque<Result<Message, InferenceError>>>,
    histories: Mutex<Vec<Vec<Message>>>,
    calls: Mutex<usize>,
}

impl MockInference {
    /// Replies with the scripted results in order; panics if called more
    /// times than scripted.
    pub fn script(results: Vec<Result<Message, InferenceError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            histories: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    /// Replies with one fixed assistant message for every call.
    pub fn replying(content: &str) -> Self {
        // A long enough script for any single test.
        Self::script(
            std::iter::repeat_with(|| Ok(Message::assistant(content)))
                .take(16)
                .collect(),
        )
    }

    /// Fails every call with `Unreachable`.
    pub fn always_fail() -> Self {
        Self::script(
            std::iter::repeat_with(|| Err(InferenceError::Unreachable("mock down".into())))
                .take(16)
                .collect(),
        )
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    /// Histories recorded for each call, in call order.
    pub fn histories(&self) -> Vec<Vec<Message>> {
        self.histories.lock().unwrap().clone()
    }
}

impl InferenceClient for MockInference {
    async fn generate(
        &self,
        _model: ModelId,
        history: &[Message],
    ) -> Result<Message, InferenceError> {
        *self.calls.lock().unwrap() += 1;
        self.histories.lock().unwrap().push(history.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockInference called more times than scripted")
    }
}
