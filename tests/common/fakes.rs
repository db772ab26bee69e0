//! Fake upstream services the server talks to over HTTP
//!
//! Each fake binds 127.0.0.1:0 and is shut down when dropped, like
//! the test server itself.

use super::constants::*;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A running fake service
pub struct FakeService {
    pub base_url: String,
    /// JSON bodies received so far, oldest first
    pub requests: Arc<Mutex<Vec<Value>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl Drop for FakeService {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

type Requests = Arc<Mutex<Vec<Value>>>;

async fn serve(router: Router, requests: Requests) -> FakeService {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake service");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Fake service failed");
    });

    FakeService {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
        _shutdown_tx: Some(shutdown_tx),
    }
}

/// Answers every completion with [`LLM_REPLY`], unless the last user
/// message mentions "boom", in which case it fails with a 500.
async fn chat_completions(
    State(requests): State<Requests>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    requests.lock().unwrap().push(body.clone());

    let last_message = body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    if last_message.contains("boom") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "model crashed"}})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": LLM_REPLY},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 42, "completion_tokens": 9, "total_tokens": 51}
        })),
    )
}

/// An OpenAI compatible chat completion API
pub async fn spawn_fake_llm() -> FakeService {
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/chat/completions", post(chat_completions))
        .with_state(requests.clone());
    serve(router, requests).await
}

async fn predict(
    State(requests): State<Requests>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    requests.lock().unwrap().push(body.clone());

    match body["image"].as_str() {
        Some(HAPPY_FACE_B64) => (StatusCode::OK, Json(json!({"prediction": "happy"}))),
        Some(BROKEN_FACE_B64) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"prediction": "error"})),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No face found in the image"})),
        ),
    }
}

/// A facial emotion classifier exposing `POST /predict`
pub async fn spawn_fake_classifier() -> FakeService {
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route("/predict", post(predict))
        .with_state(requests.clone());
    serve(router, requests).await
}
