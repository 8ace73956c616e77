//! Integration tests for the chat HTTP surface.
//!
//! Each test builds the real router over a stub LLM and drives it with
//! `tower::ServiceExt::oneshot`, carrying the session cookie by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use causerie::dialogue::{DialogueResolver, InMemorySessionStore, Phrasebook, ResolverDeps};
use causerie::error::LlmError;
use causerie::llm::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use causerie::matching::ResponseTables;
use causerie::web::{SESSION_COOKIE, chat_routes};

/// Stub LLM provider for integration tests (no real API calls).
struct StubLlm {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for StubLlm {
    fn model_name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse {
            content: format!("stub reply to: {last}"),
            finish_reason: FinishReason::Stop,
        })
    }
}

fn build_app() -> (Router, Arc<StubLlm>, Arc<InMemorySessionStore>) {
    let llm = Arc::new(StubLlm {
        calls: AtomicUsize::new(0),
    });
    let store = InMemorySessionStore::new();
    let resolver = DialogueResolver::new(ResolverDeps {
        tables: Arc::new(ResponseTables::default()),
        phrases: Arc::new(Phrasebook::english()),
        llm: llm.clone(),
        store: store.clone(),
    });
    (chat_routes(Arc::new(resolver)), llm, store)
}

fn chat_request(body: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE}={id}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Send one chat turn; returns (status, json body, session id from Set-Cookie).
async fn send(app: &Router, body: &str, session: Option<&str>) -> (StatusCode, Value, Option<String>) {
    let response = app
        .clone()
        .oneshot(chat_request(body, session))
        .await
        .unwrap();

    let status = response.status();
    let minted = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .and_then(|pair| pair.strip_prefix(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json, minted)
}

async fn turn(app: &Router, query: &str, session: &str) -> String {
    let body = serde_json::json!({ "query": query }).to_string();
    let (status, json, _) = send(app, &body, Some(session)).await;
    assert_eq!(status, StatusCode::OK);
    json["response"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _, _) = build_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn landing_page_is_html() {
    let (app, _, _) = build_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn missing_or_empty_query_is_rejected() {
    let (app, llm, store) = build_app();

    for body in [r#"{}"#, r#"{"query": ""}"#, r#"{"query": null}"#, "not json"] {
        let (status, json, minted) = send(&app, body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json["error"], "no query provided");
        assert!(minted.is_none());
    }

    assert!(store.is_empty().await);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_turn_mints_cookie_and_asks_name() {
    let (app, _, store) = build_app();

    let (status, json, minted) = send(&app, r#"{"query": "bonjour"}"#, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["response"], "What is your first name?");

    let session_id = minted.expect("first turn should set a session cookie");
    assert!(store.contains(&session_id).await);
}

#[tokio::test]
async fn full_conversation_over_http() {
    let (app, llm, _) = build_app();

    let (_, _, minted) = send(&app, r#"{"query": "salut"}"#, None).await;
    let session = minted.unwrap();

    let greeting = turn(&app, "Alice", &session).await;
    assert!(greeting.contains("Alice"));

    assert_eq!(
        turn(&app, "quel est mon prénom", &session).await,
        "Your first name is Alice."
    );
    assert_eq!(
        turn(&app, "qui êtes-vous", &session).await,
        "Je suis votre chatbot amical!"
    );
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

    assert_eq!(
        turn(&app, "raconte-moi une blague", &session).await,
        "stub reply to: raconte-moi une blague"
    );
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn existing_cookie_is_not_replaced() {
    let (app, _, _) = build_app();
    let (_, _, minted) = send(&app, r#"{"query": "salut"}"#, None).await;
    let session = minted.unwrap();

    let (status, _, again) = send(&app, r#"{"query": "Alice"}"#, Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(again.is_none());
}

#[tokio::test]
async fn sessions_do_not_share_state() {
    let (app, _, _) = build_app();

    let (_, _, a) = send(&app, r#"{"query": "salut"}"#, None).await;
    let a = a.unwrap();
    turn(&app, "Alice", &a).await;

    // A well-formed but unknown id starts from scratch.
    let unknown = "00000000-0000-4000-8000-000000000000";
    assert_eq!(
        turn(&app, "quel est mon prénom", unknown).await,
        "What is your first name?"
    );
    assert_eq!(
        turn(&app, "quel est mon prénom", &a).await,
        "Your first name is Alice."
    );
}
