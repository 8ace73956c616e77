//! HTTP endpoints: landing page, health check and the chat turn.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::cookie::{new_session_id, session_cookie, session_id_from};
use crate::dialogue::DialogueResolver;
use crate::error::ChatError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<DialogueResolver>,
}

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: Option<String>,
}

/// Successful reply to `POST /chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// Build the Axum router for the chat front-end.
pub fn chat_routes(resolver: Arc<DialogueResolver>) -> Router {
    let state = AppState { resolver };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "causerie"
    }))
}

/// POST /chat
///
/// Runs one dialogue turn for the session named by the cookie, minting a new
/// session (and cookie) when the client has none.
async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ChatError> {
    let query = match payload {
        Ok(Json(ChatRequest { query: Some(q) })) if !q.is_empty() => q,
        Ok(_) => return Err(ChatError::NoQuery),
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable chat payload");
            return Err(ChatError::NoQuery);
        }
    };

    let (session_id, minted) = match session_id_from(&headers) {
        Some(id) => (id, false),
        None => (new_session_id(), true),
    };
    if minted {
        info!(session_id = %session_id, "New chat session");
    }

    let resolution = state.resolver.handle(&session_id, &query).await?;

    let mut response = Json(ChatReply {
        response: resolution.reply,
    })
    .into_response();
    if minted {
        if let Some(cookie) = session_cookie(&session_id) {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
    }
    Ok(response)
}
