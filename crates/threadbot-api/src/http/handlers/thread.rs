//! Conversation thread HTTP handlers.
//!
//! Endpoints:
//! - POST /api/v1/threads                      - Bind a thread to a model
//! - GET  /api/v1/threads/{id}/messages        - Stored history for a thread
//! - POST /api/v1/threads/{id}/messages        - Deliver a message event
//! - POST /api/v1/threads/{id}/regenerate      - Re-run a previous exchange

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use threadbot_core::catalog::ModelCatalog;
use threadbot_core::store::SessionStore;
use threadbot_types::event::{
    Author, BindEvent, MessageEvent, RegenerateCommand, TargetMessage, UserId,
};
use threadbot_types::message::Message;
use threadbot_types::session::{ConversationSession, ThreadId};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for binding a thread to a model.
#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub thread_id: u64,
    /// Full model identifier, e.g. `@cf/meta/llama-2-7b-chat-fp16`.
    pub model: String,
    /// Platform user who picked the model.
    pub user_id: u64,
}

/// Request body for delivering an inbound message event.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub author_id: u64,
    #[serde(default)]
    pub author_is_bot: bool,
    #[serde(default)]
    pub mentions_bot: bool,
    pub content: String,
}

/// Request body for regenerating a reply.
#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub target_author_id: u64,
    #[serde(default)]
    pub target_author_is_bot: bool,
    pub target_content: String,
}

/// Session view returned by bind and history endpoints.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub thread_id: ThreadId,
    pub model: String,
    pub created_at: String,
    pub messages: Vec<Message>,
}

impl From<ConversationSession> for SessionView {
    fn from(session: ConversationSession) -> Self {
        Self {
            thread_id: session.thread_id,
            model: session.model.to_string(),
            created_at: session.created_at.to_rfc3339(),
            messages: session.messages,
        }
    }
}

/// Assistant reply produced by an exchange.
#[derive(Debug, Serialize)]
pub struct ReplyView {
    pub reply: String,
}

/// POST /api/v1/threads - Bind a new thread to a model.
pub async fn bind_thread(
    State(state): State<AppState>,
    Json(req): Json<BindRequest>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let model = ModelCatalog::resolve(&req.model)
        .ok_or_else(|| AppError::Validation(format!("Unknown model: {}", req.model)))?;

    let event = BindEvent {
        thread_id: ThreadId(req.thread_id),
        model,
        user: UserId(req.user_id),
    };
    let session = state.router.bind(&event).await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(session.into(), request_id, elapsed)))
}

/// GET /api/v1/threads/{id}/messages - Stored history for a thread.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(thread_id): Path<u64>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state
        .router
        .store()
        .get(ThreadId(thread_id))
        .await?
        .ok_or(AppError::Router(
            threadbot_types::error::RouterError::NoSessionForThread,
        ))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(session.into(), request_id, elapsed)))
}

/// POST /api/v1/threads/{id}/messages - Deliver an inbound message event.
///
/// `data` is `null` when the event is not one the bot answers (bot author,
/// no mention, empty content, or no session on the thread); the caller
/// should fall through to ordinary command processing.
pub async fn post_message(
    State(state): State<AppState>,
    Path(thread_id): Path<u64>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ApiResponse<ReplyView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let event = MessageEvent {
        author: Author {
            id: UserId(req.author_id),
            is_bot: req.author_is_bot,
        },
        mentions_bot: req.mentions_bot,
        content: req.content,
        thread_id: ThreadId(thread_id),
    };

    let reply = state.router.handle_message(&event).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(match reply {
        Some(reply) => ApiResponse::success(ReplyView { reply }, request_id, elapsed),
        None => ApiResponse::empty(request_id, elapsed),
    }))
}

/// POST /api/v1/threads/{id}/regenerate - Re-run inference for a target message.
pub async fn regenerate(
    State(state): State<AppState>,
    Path(thread_id): Path<u64>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<ApiResponse<ReplyView>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let command = RegenerateCommand {
        thread_id: ThreadId(thread_id),
        target: TargetMessage {
            author: Author {
                id: UserId(req.target_author_id),
                is_bot: req.target_author_is_bot,
            },
            content: req.target_content,
        },
    };

    let reply = state.router.regenerate(&command).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        ReplyView { reply },
        request_id,
        elapsed,
    )))
}
