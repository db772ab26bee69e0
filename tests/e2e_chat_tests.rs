//! End-to-end tests for the chatbot endpoints
//!
//! The server talks to a fake OpenAI compatible API started by the harness.

mod common;

use common::{TestClient, TestServer, TestServerOptions, LLM_REPLY, TEST_USER};
use reqwest::StatusCode;
use serde_json::Value;

fn sent_messages(server: &TestServer) -> Vec<Value> {
    server
        .llm
        .as_ref()
        .unwrap()
        .requests
        .lock()
        .unwrap()
        .clone()
}

#[tokio::test]
async fn test_send_returns_reply_and_persists_history() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.chat_send(TEST_USER, "Hi Buddy").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["reply"], LLM_REPLY);
    assert!(body["message_id"].is_number());

    let history: Vec<Value> = client.chat_history(TEST_USER).await.json().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["sender"], "user");
    assert_eq!(history[0]["message"], "Hi Buddy");
    assert_eq!(history[1]["sender"], "bot");
    assert_eq!(history[1]["message"], LLM_REPLY);
}

#[tokio::test]
async fn test_prompt_carries_context_and_running_conversation() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.chat_send(TEST_USER, "Hello").await;
    client.chat_send(TEST_USER, "I feel sad today").await;

    let requests = sent_messages(&server);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1]["model"], "fake-model");

    let messages = requests[1]["messages"].as_array().unwrap();
    let roles: Vec<&str> = messages
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    let system = messages[0]["content"].as_str().unwrap();
    assert!(system.contains("Buddy"));
    assert!(system.contains("Context: The user is feeling sad."));
    assert_eq!(messages[3]["content"], "I feel sad today");
}

#[tokio::test]
async fn test_new_conversation_forgets_context_but_keeps_history() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.chat_send(TEST_USER, "Hello").await;
    let response = client.chat_new(TEST_USER).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "New conversation started.");

    client.chat_send(TEST_USER, "Hello again").await;
    let requests = sent_messages(&server);
    let messages = requests[1]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);

    let history: Vec<Value> = client.chat_history(TEST_USER).await.json().await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn test_mood_chat_seeds_the_conversation() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .mood_chat(TEST_USER, "You look calm today, want to talk about it?")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored: Value = response.json().await.unwrap();
    assert_eq!(stored["sender"], "bot");

    client.chat_send(TEST_USER, "Sure").await;
    let requests = sent_messages(&server);
    let messages = requests[0]["messages"].as_array().unwrap();
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(
        messages[1]["content"],
        "You look calm today, want to talk about it?"
    );
}

#[tokio::test]
async fn test_chat_errors() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.chat_send("ghost", "hello").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.chat_send(TEST_USER, "   ").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        client.chat_send(TEST_USER, "boom").await.status(),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        client.chat_history("ghost").await.status(),
        StatusCode::NOT_FOUND
    );

    // A failed completion leaves nothing behind
    let history: Vec<Value> = client.chat_history(TEST_USER).await.json().await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_chat_without_llm_is_unavailable() {
    let server = TestServer::spawn_with(TestServerOptions {
        with_llm: false,
        ..Default::default()
    })
    .await;
    let client = TestClient::new(server.base_url.clone());

    assert_eq!(
        client.chat_send(TEST_USER, "hello").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
    // History and mood seeding do not need the model
    assert_eq!(client.chat_history(TEST_USER).await.status(), StatusCode::OK);
    assert_eq!(
        client.mood_chat(TEST_USER, "hello there").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_resume_returns_stored_and_in_memory_messages() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.chat_send(TEST_USER, "First").await;
    client.chat_new(TEST_USER).await;
    client.chat_send(TEST_USER, "Second").await;

    let response = client.chat_resume(TEST_USER).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_messages"], 4);
    assert_eq!(body["session"].as_array().unwrap().len(), 4);

    let memory = body["memory_session"].as_array().unwrap();
    assert_eq!(memory.len(), 2);
    assert_eq!(memory[0]["content"], "Second");
    assert_eq!(memory[1]["content"], LLM_REPLY);

    assert_eq!(
        client.chat_resume("ghost").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_messages_by_handle() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    client.chat_send(TEST_USER, "Hi there").await;

    let response = client.chat_messages(TEST_USER).await;
    assert_eq!(response.status(), StatusCode::OK);
    let messages: Vec<Value> = response.json().await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["message"], "Hi there");
    assert_eq!(messages[1]["sender"], "bot");

    assert_eq!(
        client.chat_messages("ghost").await.status(),
        StatusCode::NOT_FOUND
    );
}
