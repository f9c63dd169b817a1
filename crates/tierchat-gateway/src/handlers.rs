// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat API.
//!
//! Handles POST /chat, GET /user/{user_id}/chats,
//! GET and DELETE /user/{user_id}/chat/{chat_id}, and GET /health.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tierchat_agent::{ChatOutcome, LIMIT_NOTICE, timeout_notice};
use tierchat_core::{ConversationKey, Message, TierchatError};
use tracing::{error, info};

use crate::server::AppState;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub chat_id: String,
    pub message: Message,
}

/// The `response` field: the assistant message, or a bare notice string.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseBody {
    Message(Message),
    Notice(String),
}

/// Response body for POST /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: ResponseBody,
    pub title: Option<String>,
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// Response body for GET /user/{user_id}/chats.
#[derive(Debug, Serialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChatEntry {
    pub chat_id: String,
    /// Empty until a title has been generated.
    pub title: String,
}

/// Response body for GET /user/{user_id}/chat/{chat_id}.
#[derive(Debug, Serialize)]
pub struct ChatHistoryResponse {
    pub title: String,
    pub messages: Vec<Message>,
}

/// Response body for DELETE /user/{user_id}/chat/{chat_id}.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Maps store and generation errors to HTTP statuses.
fn failure(err: TierchatError) -> Response {
    match err {
        TierchatError::NotFound { .. } => error_response(StatusCode::NOT_FOUND, "Chat not found"),
        TierchatError::Provider { message, .. } => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// POST /chat
///
/// Runs one turn. Capacity and timeout notices are 200 responses; only a
/// failed generation call becomes a 500.
pub async fn post_chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Response {
    let key = ConversationKey::new(body.user_id, body.chat_id);

    let outcome = match state.orchestrator.handle(&key, body.message).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(key = %key, error = %e, "chat turn failed");
            return failure(e);
        }
    };

    let response = match outcome {
        ChatOutcome::Reply(reply) => ChatResponse {
            response: ResponseBody::Message(Message::assistant(reply.reply)),
            title: reply.title,
            model: Some(reply.model),
            citation: Some(reply.citation),
        },
        ChatOutcome::Capped { title } => ChatResponse {
            response: ResponseBody::Notice(LIMIT_NOTICE.to_string()),
            title,
            model: None,
            citation: None,
        },
        ChatOutcome::TimedOut => ChatResponse {
            response: ResponseBody::Notice(timeout_notice(
                state.orchestrator.timeout().as_secs(),
            )),
            title: None,
            model: None,
            citation: None,
        },
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /user/{user_id}/chats
pub async fn get_chats(State(state): State<AppState>, Path(user_id): Path<String>) -> Response {
    match state.orchestrator.store().list_chats(&user_id).await {
        Ok(chats) => Json(ChatListResponse {
            chats: chats
                .into_iter()
                .map(|c| ChatEntry {
                    chat_id: c.chat_id,
                    title: c.title.unwrap_or_default(),
                })
                .collect(),
        })
        .into_response(),
        Err(e) => failure(e),
    }
}

/// GET /user/{user_id}/chat/{chat_id}
///
/// Unknown conversations read as an empty history rather than 404.
pub async fn get_chat(
    State(state): State<AppState>,
    Path((user_id, chat_id)): Path<(String, String)>,
) -> Response {
    let key = ConversationKey::new(user_id, chat_id);
    match state.orchestrator.store().snapshot(&key).await {
        Ok(snapshot) => {
            let snapshot = snapshot.unwrap_or_else(|| tierchat_core::types::ConversationSnapshot {
                title: None,
                messages: Vec::new(),
            });
            Json(ChatHistoryResponse {
                title: snapshot.title.unwrap_or_default(),
                messages: snapshot.messages,
            })
            .into_response()
        }
        Err(e) => failure(e),
    }
}

/// DELETE /user/{user_id}/chat/{chat_id}
pub async fn delete_chat(
    State(state): State<AppState>,
    Path((user_id, chat_id)): Path<(String, String)>,
) -> Response {
    let key = ConversationKey::new(user_id.as_str(), chat_id.as_str());
    match state.orchestrator.store().delete(&key).await {
        Ok(()) => {
            info!(key = %key, "chat deleted");
            Json(DeleteResponse {
                message: format!(
                    "Chat {chat_id} for user {user_id} has been deleted successfully"
                ),
            })
            .into_response()
        }
        Err(e) => failure(e),
    }
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_deserializes() {
        let json = r#"{"user_id":"u1","chat_id":"c1","message":{"role":"user","content":"hi"}}"#;
        let req: ChatRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.message, Message::user("hi"));
    }

    #[test]
    fn response_body_is_untagged() {
        let reply = serde_json::to_value(ResponseBody::Message(Message::assistant("x"))).unwrap();
        assert_eq!(reply, serde_json::json!({"role": "assistant", "content": "x"}));

        let notice = serde_json::to_value(ResponseBody::Notice("stop".into())).unwrap();
        assert_eq!(notice, serde_json::json!("stop"));
    }

    #[test]
    fn notice_response_omits_citation() {
        let resp = ChatResponse {
            response: ResponseBody::Notice(LIMIT_NOTICE.into()),
            title: Some("T".into()),
            model: None,
            citation: None,
        };
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"response": LIMIT_NOTICE, "title": "T", "model": null})
        );
    }

    #[test]
    fn provider_errors_keep_their_message() {
        let resp = failure(TierchatError::provider("Gemini API error 429 (RESOURCE_EXHAUSTED): slow down"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
