//! End-to-end tests for mood analysis endpoints
//!
//! Tests fusion of facial labels with raw, pre-resolved and live EEG data.

mod common;

use common::{TestClient, TestServer, TestServerOptions, TEST_USER};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_home_reports_uptime_and_hash() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert!(body["uptime"].as_str().unwrap().starts_with("0d "));
    assert!(body["hash"].is_string());
}

#[tokio::test]
async fn test_analyze_fuses_face_and_dominant_band() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .analyze(json!({
            "facial_emotion": "Happy",
            "eeg_data": {"alpha": 30.0, "beta": 10.0, "theta": 5.0, "delta": 2.0, "gamma": 1.0}
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    let analysis = &body["analysis"];
    assert_eq!(analysis["facial_analysis"]["emotion"], "happy");
    assert_eq!(analysis["eeg_analysis"]["dominant_band"], "Alpha");
    assert_eq!(analysis["eeg_analysis"]["emotional_state"], "Peaceful Contentment");
    assert_eq!(analysis["combined_analysis"]["title"], "Authentic Joy");
    assert_eq!(analysis["combined_analysis"]["combined_mood"], "happy_happy");
    assert!(analysis["combined_analysis"]["chatAsk"].is_string());
    assert_eq!(analysis["raw_data"]["dominant_frequency"], "alpha");
    assert_eq!(analysis["raw_data"]["frequency_strength"], 30.0);
    assert_eq!(body["timestamp"], analysis["timestamp"]);
    assert!(body.get("saved_entry").is_none());
}

#[tokio::test]
async fn test_analyze_rejects_unknown_emotion_and_empty_bands() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .analyze(json!({"facial_emotion": "bored", "eeg_data": {"alpha": 1.0}}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("bored"));

    let response = client
        .analyze(json!({"facial_emotion": "happy", "eeg_data": {}}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_band_uses_pre_resolved_band() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .analyze_band(json!({
            "facial_emotion": "happy",
            "dominant_eeg_band": "Theta",
            "band_strength": 12.5
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let analysis = &body["analysis"];
    assert_eq!(analysis["eeg_analysis"]["dominant_band"], "Theta");
    assert_eq!(analysis["combined_analysis"]["title"], "Masked Depression");
    assert_eq!(analysis["raw_data"]["frequency_strength"], 12.5);
    assert!(analysis["raw_data"]["eeg_frequencies"].is_null());

    let response = client
        .analyze_band(json!({"facial_emotion": "happy", "dominant_eeg_band": "Kappa"}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_saves_to_journal_when_user_given() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .analyze(json!({
            "facial_emotion": "sad",
            "eeg_data": {"alpha": 1.0, "beta": 1.0, "theta": 9.0, "delta": 1.0, "gamma": 1.0},
            "user_id": TEST_USER,
            "note": "rainy day"
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let entry = &body["saved_entry"];
    assert_eq!(entry["user_id"], TEST_USER);
    assert_eq!(entry["mood"], "sad");
    assert_eq!(entry["combined_mood"], "sad_sad");
    assert_eq!(entry["eeg_emotional_state"], "Emotional Vulnerability");
    assert_eq!(entry["note"], "rainy day");

    let journal: Vec<Value> = client.get_journal(TEST_USER).await.json().await.unwrap();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0]["id"], entry["id"]);
}

#[tokio::test]
async fn test_analyze_for_unknown_user_is_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .analyze(json!({
            "facial_emotion": "happy",
            "eeg_data": {"alpha": 3.0},
            "user_id": "ghost"
        }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analyze_live_uses_latest_feed_sample() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.analyze_live(json!({"facial_emotion": "neutral"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["analysis"]["eeg_analysis"]["dominant_band"], "Alpha");

    server.eeg_feed.set(mood_fusion_server::mood::EegBandPowers::new(
        1.0, 40.0, 1.0, 1.0, 1.0,
    ));
    let body: Value = client
        .analyze_live(json!({"facial_emotion": "neutral"}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["analysis"]["eeg_analysis"]["dominant_band"], "Beta");
}

#[tokio::test]
async fn test_analyze_live_without_sample_is_unavailable() {
    let server = TestServer::spawn_with(TestServerOptions {
        eeg_sample: None,
        ..Default::default()
    })
    .await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.analyze_live(json!({"facial_emotion": "happy"})).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analyze_with_non_numeric_bands_is_a_json_bad_request() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .analyze(json!({
            "facial_emotion": "happy",
            "eeg_data": {"alpha": "x", "beta": "x", "theta": "x", "delta": "x", "gamma": "x"}
        }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}
