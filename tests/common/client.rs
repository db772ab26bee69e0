//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {} failed: {}", path, e))
    }

    async fn put_json(&self, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap_or_else(|e| panic!("PUT {} failed: {}", path, e))
    }

    async fn get_query(&self, path: &str, query: &[(&str, String)]) -> Response {
        self.client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {} failed: {}", path, e))
    }

    // ========================================================================
    // Server
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get_query("/", &[]).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// POST /v1/users/signup
    pub async fn signup(&self, handle: &str, email: &str, password: &str) -> Response {
        self.post_json(
            "/v1/users/signup",
            json!({
                "username": handle,
                "email": email,
                "full_name": "New Person",
                "dob": "1990-04-01",
                "password": password
            }),
        )
        .await
    }

    /// POST /v1/users/login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.post_json(
            "/v1/users/login",
            json!({"email": email, "password": password}),
        )
        .await
    }

    /// GET /v1/users/{id}
    pub async fn get_user(&self, id: usize) -> Response {
        self.get_query(&format!("/v1/users/{}", id), &[]).await
    }

    /// PUT /v1/users/{id}
    pub async fn update_user(&self, id: usize, update: Value) -> Response {
        self.put_json(&format!("/v1/users/{}", id), update).await
    }

    // ========================================================================
    // Mood analysis
    // ========================================================================

    /// POST /v1/moods/analyze
    pub async fn analyze(&self, body: Value) -> Response {
        self.post_json("/v1/moods/analyze", body).await
    }

    /// POST /v1/moods/analyze/band
    pub async fn analyze_band(&self, body: Value) -> Response {
        self.post_json("/v1/moods/analyze/band", body).await
    }

    /// POST /v1/moods/analyze/live
    pub async fn analyze_live(&self, body: Value) -> Response {
        self.post_json("/v1/moods/analyze/live", body).await
    }

    // ========================================================================
    // Journal
    // ========================================================================

    /// GET /v1/moods?user_id=
    pub async fn get_journal(&self, handle: &str) -> Response {
        self.get_query("/v1/moods", &[("user_id", handle.to_string())])
            .await
    }

    /// GET /v1/moods with paging
    pub async fn get_journal_page(&self, handle: &str, limit: usize, offset: usize) -> Response {
        self.get_query(
            "/v1/moods",
            &[
                ("user_id", handle.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    /// GET /v1/moods with a raw query string
    pub async fn get_journal_raw(&self, query: &str) -> Response {
        self.client
            .get(format!("{}?{}", self.url("/v1/moods"), query))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET /v1/moods failed: {}", e))
    }

    /// GET /v1/moods/filter
    pub async fn filter_journal(&self, handle: &str, filters: &[(&str, &str)]) -> Response {
        let mut query = vec![("user_id", handle.to_string())];
        query.extend(filters.iter().map(|(k, v)| (*k, v.to_string())));
        self.get_query("/v1/moods/filter", &query).await
    }

    /// POST /v1/moods/save
    pub async fn save_entry(&self, entry: Value) -> Response {
        self.post_json("/v1/moods/save", entry).await
    }

    /// POST /v1/moods/create
    pub async fn create_entry(&self, entry: Value) -> Response {
        self.post_json("/v1/moods/create", entry).await
    }

    /// PUT /v1/moods/update
    pub async fn update_entry(&self, entry: Value) -> Response {
        self.put_json("/v1/moods/update", entry).await
    }

    // ========================================================================
    // Chatbot
    // ========================================================================

    /// POST /v1/chatbot/send
    pub async fn chat_send(&self, handle: &str, message: &str) -> Response {
        self.post_json(
            "/v1/chatbot/send",
            json!({"user_id": handle, "message": message}),
        )
        .await
    }

    /// POST /v1/chatbot/new
    pub async fn chat_new(&self, handle: &str) -> Response {
        self.post_json("/v1/chatbot/new", json!({"user_id": handle}))
            .await
    }

    /// GET /v1/chatbot/history
    pub async fn chat_history(&self, handle: &str) -> Response {
        self.get_query("/v1/chatbot/history", &[("user_id", handle.to_string())])
            .await
    }

    /// GET /v1/chatbot/resume
    pub async fn chat_resume(&self, handle: &str) -> Response {
        self.get_query("/v1/chatbot/resume", &[("user_id", handle.to_string())])
            .await
    }

    /// GET /v1/chatbot/messages/{user_handle}
    pub async fn chat_messages(&self, handle: &str) -> Response {
        self.get_query(&format!("/v1/chatbot/messages/{}", handle), &[])
            .await
    }

    /// POST /v1/chatbot/mood-chat
    pub async fn mood_chat(&self, handle: &str, message: &str) -> Response {
        self.post_json(
            "/v1/chatbot/mood-chat",
            json!({"user_id": handle, "message": message}),
        )
        .await
    }

    // ========================================================================
    // Sensors
    // ========================================================================

    /// GET /v1/eeg/bandpower
    pub async fn band_power(&self) -> Response {
        self.get_query("/v1/eeg/bandpower", &[]).await
    }

    /// POST /v1/eeg/bandpower
    pub async fn push_band_power(&self, sample: Value) -> Response {
        self.post_json("/v1/eeg/bandpower", sample).await
    }

    /// POST /v1/facial_emotion
    pub async fn classify_face(&self, image: &str) -> Response {
        self.post_json("/v1/facial_emotion", json!({"image": image}))
            .await
    }
}
