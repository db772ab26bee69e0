//! Mood journal routes, keyed by user handle.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::server::error::{ApiError, ApiResult};
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::state::{GuardedUserManager, ServerState};
use crate::user::{MoodEntry, MoodEntryDraft, MoodEntryFilter, DEFAULT_JOURNAL_PAGE, MAX_JOURNAL_PAGE};

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    pub user_id: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct JournalFilterQuery {
    pub user_id: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub eeg_state: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

async fn save_entry(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(draft): ApiJson<MoodEntryDraft>,
) -> ApiResult<Json<MoodEntry>> {
    Ok(Json(user_manager.save_mood_entry(&draft)?))
}

/// Same upsert as `save_entry`, answered with 201.
async fn create_entry(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(draft): ApiJson<MoodEntryDraft>,
) -> ApiResult<(StatusCode, Json<MoodEntry>)> {
    let entry = user_manager.save_mood_entry(&draft)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_entry(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(draft): ApiJson<MoodEntryDraft>,
) -> ApiResult<Json<MoodEntry>> {
    Ok(Json(user_manager.update_mood_entry(&draft)?))
}

async fn list_entries(
    State(user_manager): State<GuardedUserManager>,
    ApiQuery(query): ApiQuery<JournalQuery>,
) -> ApiResult<Json<Vec<MoodEntry>>> {
    let filter = MoodEntryFilter {
        limit: query.limit.unwrap_or(DEFAULT_JOURNAL_PAGE),
        offset: query.offset,
        ..Default::default()
    };
    Ok(Json(user_manager.mood_entries(&query.user_id, &filter)?))
}

async fn filter_entries(
    State(user_manager): State<GuardedUserManager>,
    ApiQuery(query): ApiQuery<JournalFilterQuery>,
) -> ApiResult<Json<Vec<MoodEntry>>> {
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(ApiError::bad_request("start_date must not be after end_date"));
        }
    }
    let filter = MoodEntryFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        mood: query.mood,
        eeg_state: query.eeg_state,
        limit: query.limit.unwrap_or(MAX_JOURNAL_PAGE),
        offset: query.offset,
    };
    Ok(Json(user_manager.mood_entries(&query.user_id, &filter)?))
}

pub fn journal_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/save", post(save_entry))
        .route("/create", post(create_entry))
        .route("/update", put(update_entry))
        .route("/filter", get(filter_entries))
}
