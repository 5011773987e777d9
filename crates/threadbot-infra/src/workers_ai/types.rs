//! Wire types for the Workers AI `/ai/run/{model}` endpoint.
//!
//! The response is parsed into an explicit schema and anything that does
//! not match fails closed as `MalformedResponse` -- the payload shape is
//! never trusted dynamically.

use serde::{Deserialize, Serialize};

use threadbot_types::message::Message;

/// Request body: the full ordered message history.
#[derive(Debug, Serialize)]
pub struct WorkersAiRequest<'a> {
    pub messages: &'a [Message],
}

/// Envelope of every Workers AI response.
#[derive(Debug, Deserialize)]
pub struct WorkersAiResponse {
    #[serde(default)]
    pub success: bool,
    pub result: Option<WorkersAiResult>,
    #[serde(default)]
    pub errors: Vec<WorkersAiApiError>,
}

/// The generated payload on success.
#[derive(Debug, Deserialize)]
pub struct WorkersAiResult {
    pub response: Option<String>,
}

/// Error detail reported by the service.
#[derive(Debug, Deserialize)]
pub struct WorkersAiApiError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl WorkersAiResponse {
    /// Extract the generated text, if the envelope carries one.
    pub fn into_text(self) -> Option<String> {
        self.result.and_then(|r| r.response).filter(|s| !s.is_empty())
    }

    /// Join reported error messages for diagnostics.
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            "no error detail".to_string()
        } else {
            self.errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ")
        }
    }
}
