//! User data models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::mood::AnalysisSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: usize,
    #[serde(rename = "username")]
    pub handle: String,
    pub email: String,
    pub full_name: String,
    pub dob: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(rename = "username")]
    pub handle: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    pub password: String,
}

/// Partial profile change, absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default, rename = "username")]
    pub handle: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A day in a user's mood journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodEntry {
    pub id: usize,
    /// Handle of the owner.
    pub user_id: String,
    pub mood_date: NaiveDate,
    pub mood: Option<String>,
    pub combined_mood: Option<String>,
    pub eeg_emotional_state: Option<String>,
    pub note: Option<String>,
}

/// Values written to the journal for (user, date).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MoodEntryDraft {
    pub user_id: String,
    pub mood_date: NaiveDate,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub combined_mood: Option<String>,
    #[serde(default)]
    pub eeg_emotional_state: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl MoodEntryDraft {
    /// Journal line for an analysis, dated on the analysis' UTC day.
    pub fn from_session(
        user_handle: &str,
        session: &AnalysisSession,
        note: Option<String>,
    ) -> Self {
        Self {
            user_id: user_handle.to_string(),
            mood_date: session.created_at().date_naive(),
            mood: Some(session.facial_emotion().to_string()),
            combined_mood: Some(session.combined_mood()),
            eeg_emotional_state: Some(session.eeg_state().emotional_state.to_string()),
            note,
        }
    }
}

pub const DEFAULT_JOURNAL_PAGE: usize = 100;
pub const MAX_JOURNAL_PAGE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodEntryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub mood: Option<String>,
    pub eeg_state: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for MoodEntryFilter {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            mood: None,
            eeg_state: None,
            limit: DEFAULT_JOURNAL_PAGE,
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Bot,
}

impl ChatSender {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatSender::User => "user",
            ChatSender::Bot => "bot",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(ChatSender::User),
            "bot" => Some(ChatSender::Bot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: usize,
    pub sender: ChatSender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
