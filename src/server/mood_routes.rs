//! Mood analysis routes.
//!
//! - POST /analyze: facial label + raw band powers
//! - POST /analyze/band: facial label + an already resolved dominant band
//! - POST /analyze/live: facial label + the EEG feed's latest sample

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mood::{self, AnalysisReport, AnalysisSession, EegBandPowers};
use crate::server::error::{ApiError, ApiResult};
use crate::server::extract::ApiJson;
use crate::server::metrics::record_mood_analysis;
use crate::server::state::{GuardedEegFeed, GuardedUserManager, ServerState};
use crate::user::{MoodEntry, MoodEntryDraft};

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    pub facial_emotion: String,
    #[serde(default)]
    pub eeg_data: EegBandPowers,
    /// Handle of the user whose journal should receive the result.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeBandBody {
    pub facial_emotion: String,
    pub dominant_eeg_band: String,
    #[serde(default)]
    pub band_strength: Option<f64>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LiveAnalyzeBody {
    pub facial_emotion: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub analysis: AnalysisReport,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_entry: Option<MoodEntry>,
}

fn respond_with_analysis(
    user_manager: &GuardedUserManager,
    session: AnalysisSession,
    user_id: Option<String>,
    note: Option<String>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let saved_entry = match user_id {
        Some(handle) => {
            let draft = MoodEntryDraft::from_session(&handle, &session, note);
            Some(user_manager.save_mood_entry(&draft)?)
        }
        None => None,
    };

    record_mood_analysis(
        session.facial_emotion().as_str(),
        session.eeg_dominant_band().as_str(),
    );
    debug!(
        "Analysis {} resolved to {}",
        session.session_id(),
        session.combined_mood()
    );

    let analysis = session.report();
    Ok(Json(AnalyzeResponse {
        status: "success",
        timestamp: analysis.timestamp.clone(),
        analysis,
        saved_entry,
    }))
}

async fn analyze(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(body): ApiJson<AnalyzeBody>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let session = mood::assemble(&body.facial_emotion, &body.eeg_data)?;
    respond_with_analysis(&user_manager, session, body.user_id, body.note)
}

async fn analyze_band(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(body): ApiJson<AnalyzeBandBody>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let session = mood::assemble_pre_resolved(
        &body.facial_emotion,
        &body.dominant_eeg_band,
        body.band_strength,
    )?;
    respond_with_analysis(&user_manager, session, body.user_id, body.note)
}

async fn analyze_live(
    State(user_manager): State<GuardedUserManager>,
    State(eeg_feed): State<GuardedEegFeed>,
    ApiJson(body): ApiJson<LiveAnalyzeBody>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let powers = eeg_feed
        .latest()
        .ok_or_else(|| ApiError::unavailable("No EEG sample available yet"))?;
    let session = mood::assemble(&body.facial_emotion, &powers)?;
    respond_with_analysis(&user_manager, session, body.user_id, body.note)
}

pub fn mood_routes() -> Router<ServerState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/analyze/band", post(analyze_band))
        .route("/analyze/live", post(analyze_live))
}
