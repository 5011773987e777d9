//! Regeneration: re-run inference for a previously answered user message.
//!
//! Regeneration does not remove or replace the original assistant reply in
//! the stored history; it appends a new user/assistant pair on top. The
//! caller only updates the displayed message with the new assistant output,
//! so the persisted conversation keeps both exchanges.

use tracing::info;

use threadbot_types::error::RouterError;
use threadbot_types::event::RegenerateCommand;

use crate::inference::InferenceClient;
use crate::router::SessionRouter;
use crate::store::SessionStore;

impl<S: SessionStore, I: InferenceClient> SessionRouter<S, I> {
    /// Re-invoke inference using the target message's text as new user
    /// input.
    ///
    /// Fails with [`RouterError::NoSessionForThread`] when the thread is not
    /// a conversation thread, and with [`RouterError::InvalidTarget`] when
    /// the target was authored by the bot or has no content. Neither failure
    /// mutates the store.
    pub async fn regenerate(&self, command: &RegenerateCommand) -> Result<String, RouterError> {
        let gate = self.lock_for(command.thread_id);
        let _guard = gate.lock().await;

        let Some(session) = self.store().get(command.thread_id).await? else {
            return Err(RouterError::NoSessionForThread);
        };

        if command.target.author.is_bot || command.target.content.is_empty() {
            return Err(RouterError::InvalidTarget);
        }

        info!(thread_id = %command.thread_id, "regenerating reply");
        self.run_exchange(session, command.target.content.clone())
            .await
    }
}
