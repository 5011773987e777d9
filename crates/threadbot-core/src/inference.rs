//! InferenceClient trait and bounded retry wrapper.
//!
//! The client wraps a single external call: given a model and the full
//! ordered message history, return one generated assistant message or a
//! typed failure. It persists nothing.

use std::time::Duration;

use tracing::warn;

use threadbot_types::error::InferenceError;
use threadbot_types::message::Message;
use threadbot_types::model::ModelId;

/// Maximum attempts for a single logical generate call.
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between retries when the service gives no hint.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Trait for inference service backends.
///
/// Implementations live in threadbot-infra (e.g., `WorkersAiClient`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait InferenceClient: Send + Sync {
    /// Send the full ordered history and return the generated assistant
    /// message.
    fn generate(
        &self,
        model: ModelId,
        history: &[Message],
    ) -> impl std::future::Future<Output = Result<Message, InferenceError>> + Send;
}

/// Run `generate` with bounded retries for transient failures.
///
/// `Unreachable` and `RateLimited` are retried up to [`MAX_ATTEMPTS`] total
/// attempts, honoring the service's `retry_after_ms` hint when present.
/// `MalformedResponse` is surfaced immediately.
pub async fn generate_with_retry<I: InferenceClient>(
    client: &I,
    model: ModelId,
    history: &[Message],
) -> Result<Message, InferenceError> {
    let mut attempt = 1;
    loop {
        match client.generate(model, history).await {
            Ok(message) => return Ok(message),
            Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                let delay = match &err {
                    InferenceError::RateLimited {
                        retry_after_ms: Some(ms),
                    } => Duration::from_millis(*ms),
                    _ => RETRY_BASE_DELAY * attempt,
                };
                warn!(model = %model, attempt, error = %err, "inference attempt failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
