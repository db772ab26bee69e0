use crate::sqlite_column;
use crate::sqlite_persistence::{
    open_versioned_db, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    DEFAULT_TIMESTAMP,
};
use crate::user::*;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};
use tracing::debug;

pub const DB_FILE_NAME: &str = "mood.db";

const USER_FK: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("full_name", &SqlType::Text, non_null = true),
        sqlite_column!("dob", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_handle", "handle"), ("idx_user_email", "email")],
};
const USER_PASSWORD_CREDENTIALS_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("last_tried", &SqlType::Integer),
        sqlite_column!("last_used", &SqlType::Integer),
    ],
    unique_constraints: &[],
    indices: &[],
};
const MOOD_ENTRY_TABLE_V_0: Table = Table {
    name: "mood_entry",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("mood_date", &SqlType::Text, non_null = true),
        sqlite_column!("mood", &SqlType::Text),
        sqlite_column!("combined_mood", &SqlType::Text),
        sqlite_column!("eeg_emotional_state", &SqlType::Text),
        sqlite_column!("note", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["user_id", "mood_date"]],
    indices: &[("idx_mood_entry_user_id", "user_id")],
};
const CHAT_MESSAGE_TABLE_V_0: Table = Table {
    name: "chat_message",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FK)
        ),
        sqlite_column!("sender", &SqlType::Text, non_null = true),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        // unix millis
        sqlite_column!("created", &SqlType::Integer, non_null = true),
    ],
    unique_constraints: &[],
    indices: &[("idx_chat_message_user_id", "user_id")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_V_0,
        MOOD_ENTRY_TABLE_V_0,
        CHAT_MESSAGE_TABLE_V_0,
    ],
    migration: None,
}];

fn unique_violation(err: &rusqlite::Error) -> Option<UniqueUserField> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            if message.contains("user.email") {
                Some(UniqueUserField::Email)
            } else if message.contains("user.handle") {
                Some(UniqueUserField::Handle)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Surfaces unique collisions as `UniqueUserField` so callers can downcast them.
fn map_user_write_error(err: rusqlite::Error, what: String) -> anyhow::Error {
    match unique_violation(&err) {
        Some(field) => field.into(),
        None => anyhow::Error::new(err).context(what),
    }
}

const USER_COLUMNS: &str = "id, handle, email, full_name, dob";
const MOOD_ENTRY_SELECT: &str = "SELECT e.id, u.handle, e.mood_date, e.mood, e.combined_mood, e.eeg_emotional_state, e.note \
    FROM mood_entry e JOIN user u ON u.id = e.user_id";

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        handle: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        dob: row.get::<_, Option<NaiveDate>>(4)?,
    })
}

fn mood_entry_from_row(row: &Row) -> rusqlite::Result<MoodEntry> {
    Ok(MoodEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        mood_date: row.get(2)?,
        mood: row.get(3)?,
        combined_mood: row.get(4)?,
        eeg_emotional_state: row.get(5)?,
        note: row.get(6)?,
    })
}

fn chat_message_from_row(row: &Row) -> rusqlite::Result<ChatMessage> {
    let sender: String = row.get(1)?;
    let sender = ChatSender::from_str(&sender).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(1, sender.clone(), rusqlite::types::Type::Text)
    })?;
    let created_ms: i64 = row.get(3)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        sender,
        message: row.get(2)?,
        timestamp: DateTime::from_timestamp_millis(created_ms)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, created_ms))?,
    })
}

fn system_time_from_column_result(value: i64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(value as u64)
}

fn query_mood_entry(
    conn: &Connection,
    user_handle: &str,
    date: NaiveDate,
) -> Result<Option<MoodEntry>> {
    Ok(conn
        .query_row(
            &format!("{} WHERE u.handle = ?1 AND e.mood_date = ?2", MOOD_ENTRY_SELECT),
            params![user_handle, date],
            mood_entry_from_row,
        )
        .optional()?)
}

#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteUserStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Looks for the database file in the current directory and its parents.
    pub fn infer_path() -> Option<PathBuf> {
        let mut current_dir = std::env::current_dir().ok()?;
        loop {
            let candidate = current_dir.join(DB_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current_dir = current_dir.parent()?.to_path_buf();
        }
    }
}

impl UserStore for SqliteUserStore {
    fn create_user(
        &self,
        handle: &str,
        email: &str,
        full_name: &str,
        dob: Option<NaiveDate>,
    ) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (handle, email, full_name, dob) VALUES (?1, ?2, ?3, ?4)",
            params![handle, email, full_name, dob],
        )
        .map_err(|e| map_user_write_error(e, format!("Failed to create user {}", handle)))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user(&self, user_id: usize) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM user WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_by_handle(&self, handle: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM user WHERE handle = ?1", USER_COLUMNS),
                params![handle],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM user WHERE email = ?1", USER_COLUMNS),
                params![email],
                user_from_row,
            )
            .optional()?)
    }

    fn get_user_id(&self, handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![handle],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get_all_user_handles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT handle FROM user ORDER BY handle")?;
        let handles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(handles)
    }

    fn update_user(&self, user_id: usize, update: &UserUpdate) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE user SET handle = COALESCE(?2, handle), email = COALESCE(?3, email), \
                 full_name = COALESCE(?4, full_name), dob = COALESCE(?5, dob) WHERE id = ?1",
                params![
                    user_id,
                    update.handle,
                    update.email,
                    update.full_name,
                    update.dob
                ],
            )
            .map_err(|e| map_user_write_error(e, format!("Failed to update user {}", user_id)))?;
        if updated == 0 {
            return Ok(None);
        }
        Ok(conn
            .query_row(
                &format!("SELECT {} FROM user WHERE id = ?1", USER_COLUMNS),
                params![user_id],
                user_from_row,
            )
            .optional()?)
    }
}

impl UserAuthCredentialsStore for SqliteUserStore {
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT user_id, salt, hash, hasher, created, last_tried, last_used \
                 FROM user_password_credentials WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, usize>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                        row.get::<_, Option<i64>>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((user_id, salt, hash, hasher, created, last_tried, last_used)) = row else {
            return Ok(None);
        };
        Ok(Some(PasswordCredentials {
            user_id,
            salt,
            hash,
            hasher: PasswordHasher::from_str(&hasher)?,
            created: system_time_from_column_result(created),
            last_tried: last_tried.map(system_time_from_column_result),
            last_used: last_used.map(system_time_from_column_result),
        }))
    }

    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user_password_credentials (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(user_id) DO UPDATE SET salt = excluded.salt, hash = excluded.hash, hasher = excluded.hasher",
            params![
                credentials.user_id,
                credentials.salt,
                credentials.hash,
                credentials.hasher.to_string()
            ],
        )
        .with_context(|| format!("Failed to store credentials of user {}", credentials.user_id))?;
        Ok(())
    }

    fn delete_password_credentials(&self, user_id: usize) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM user_password_credentials WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(deleted > 0)
    }

    fn mark_password_attempt(&self, user_id: usize, succeeded: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let sql = if succeeded {
            format!(
                "UPDATE user_password_credentials SET last_tried = {0}, last_used = {0} WHERE user_id = ?1",
                DEFAULT_TIMESTAMP
            )
        } else {
            format!(
                "UPDATE user_password_credentials SET last_tried = {} WHERE user_id = ?1",
                DEFAULT_TIMESTAMP
            )
        };
        conn.execute(&sql, params![user_id])?;
        Ok(())
    }
}

impl MoodJournalStore for SqliteUserStore {
    fn upsert_mood_entry(&self, draft: &MoodEntryDraft) -> Result<MoodEntry> {
        let conn = self.conn.lock().unwrap();
        let user_id: usize = conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![draft.user_id],
                |row| row.get(0),
            )
            .optional()?
            .with_context(|| format!("User {} not found", draft.user_id))?;
        conn.execute(
            &format!(
                "INSERT INTO mood_entry (user_id, mood_date, mood, combined_mood, eeg_emotional_state, note) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(user_id, mood_date) DO UPDATE SET mood = excluded.mood, \
                 combined_mood = excluded.combined_mood, eeg_emotional_state = excluded.eeg_emotional_state, \
                 note = excluded.note, updated = {}",
                DEFAULT_TIMESTAMP
            ),
            params![
                user_id,
                draft.mood_date,
                draft.mood,
                draft.combined_mood,
                draft.eeg_emotional_state,
                draft.note
            ],
        )?;
        debug!(
            "Saved mood entry of {} for {}",
            draft.user_id, draft.mood_date
        );
        query_mood_entry(&conn, &draft.user_id, draft.mood_date)?
            .context("Mood entry vanished after upsert")
    }

    fn update_mood_entry(&self, draft: &MoodEntryDraft) -> Result<Option<MoodEntry>> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE mood_entry SET mood = ?3, combined_mood = ?4, eeg_emotional_state = ?5, \
                 note = ?6, updated = {} \
                 WHERE user_id = (SELECT id FROM user WHERE handle = ?1) AND mood_date = ?2",
                DEFAULT_TIMESTAMP
            ),
            params![
                draft.user_id,
                draft.mood_date,
                draft.mood,
                draft.combined_mood,
                draft.eeg_emotional_state,
                draft.note
            ],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        query_mood_entry(&conn, &draft.user_id, draft.mood_date)
    }

    fn get_mood_entry(&self, user_handle: &str, date: NaiveDate) -> Result<Option<MoodEntry>> {
        let conn = self.conn.lock().unwrap();
        query_mood_entry(&conn, user_handle, date)
    }

    fn get_mood_entries(
        &self,
        user_handle: &str,
        filter: &MoodEntryFilter,
    ) -> Result<Vec<MoodEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "{} WHERE u.handle = ?1 \
             AND (?2 IS NULL OR e.mood_date >= ?2) \
             AND (?3 IS NULL OR e.mood_date <= ?3) \
             AND (?4 IS NULL OR e.mood = ?4) \
             AND (?5 IS NULL OR e.eeg_emotional_state = ?5) \
             ORDER BY e.mood_date DESC LIMIT ?6 OFFSET ?7",
            MOOD_ENTRY_SELECT
        ))?;
        let entries = stmt
            .query_map(
                params![
                    user_handle,
                    filter.start_date,
                    filter.end_date,
                    filter.mood,
                    filter.eeg_state,
                    filter.limit as i64,
                    filter.offset as i64
                ],
                mood_entry_from_row,
            )?
            .collect::<Result<Vec<MoodEntry>, _>>()?;
        Ok(entries)
    }
}

impl ChatMessageStore for SqliteUserStore {
    fn append_chat_message(
        &self,
        user_id: usize,
        sender: ChatSender,
        message: &str,
    ) -> Result<ChatMessage> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        conn.execute(
            "INSERT INTO chat_message (user_id, sender, message, created) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, sender.as_str(), message, now.timestamp_millis()],
        )
        .with_context(|| format!("Failed to store chat message of user {}", user_id))?;
        Ok(ChatMessage {
            id: conn.last_insert_rowid() as usize,
            sender,
            message: message.to_string(),
            // what the row holds, truncated to millis
            timestamp: DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now),
        })
    }

    fn get_chat_messages(&self, user_id: usize) -> Result<Vec<ChatMessage>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, sender, message, created FROM chat_message WHERE user_id = ?1 ORDER BY created, id",
        )?;
        let messages = stmt
            .query_map(params![user_id], chat_message_from_row)?
            .collect::<Result<Vec<ChatMessage>, _>>()?;
        Ok(messages)
    }
}
