//! WorkersAiClient -- concrete [`InferenceClient`] implementation for
//! Cloudflare Workers AI.
//!
//! Sends the full ordered history to `POST /accounts/{account}/ai/run/{model}`
//! with bearer authentication and a bounded request timeout; timeout expiry
//! and transport failures surface as `Unreachable`.
//!
//! The API token is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use threadbot_core::inference::InferenceClient;
use threadbot_types::error::InferenceError;
use threadbot_types::message::Message;
use threadbot_types::model::ModelId;

use super::types::{WorkersAiRequest, WorkersAiResponse};

/// Cloudflare Workers AI inference client.
///
/// # API Token Security
///
/// The token is stored as a [`SecretString`] and only exposed when building
/// the Authorization header. This type intentionally does NOT derive Debug.
pub struct WorkersAiClient {
    client: reqwest::Client,
    api_token: SecretString,
    account_id: String,
    base_url: String,
}

impl WorkersAiClient {
    /// Bound on a single inference request, including connect time.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new client for the given account.
    pub fn new(api_token: SecretString, account_id: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_token,
            account_id: account_id.into(),
            base_url: "https://api.cloudflare.com/client/v4".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full endpoint URL for a model run.
    fn run_url(&self, model: ModelId) -> String {
        format!("{}/accounts/{}/ai/run/{}", self.base_url, self.account_id, model)
    }
}

impl InferenceClient for WorkersAiClient {
    async fn generate(
        &self,
        model: ModelId,
        history: &[Message],
    ) -> Result<Message, InferenceError> {
        let url = self.run_url(model);
        let body = WorkersAiRequest { messages: history };
        tracing::debug!(model = %model, history_len = history.len(), "invoking inference");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000));
            return Err(InferenceError::RateLimited { retry_after_ms });
        }
        if status.is_server_error() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::Unreachable(format!("HTTP {status}: {detail}")));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(InferenceError::MalformedResponse(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let envelope: WorkersAiResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::MalformedResponse(format!("failed to parse response: {e}")))?;

        let summary = envelope.error_summary();
        let text = envelope
            .into_text()
            .ok_or_else(|| {
                InferenceError::MalformedResponse(format!(
                    "no generated text in response: {summary}"
                ))
            })?;

        Ok(Message::assistant(text))
    }
}
