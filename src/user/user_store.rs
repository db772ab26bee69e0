use super::auth::PasswordCredentials;
use super::user_models::{
    ChatMessage, ChatSender, MoodEntry, MoodEntryDraft, MoodEntryFilter, User, UserUpdate,
};
use anyhow::Result;
use chrono::NaiveDate;
use thiserror::Error;

/// Returned by `UserStore` writes that collide with another user's unique field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UniqueUserField {
    #[error("email already in use")]
    Email,
    #[error("handle already in use")]
    Handle,
}

pub trait UserAuthCredentialsStore: Send + Sync {
    /// Returns the password credentials of a user.
    /// Returns Ok(None) if the user does not exist or has no password.
    fn get_password_credentials(&self, user_id: usize) -> Result<Option<PasswordCredentials>>;

    /// Inserts or replaces the password credentials of a user.
    fn set_password_credentials(&self, credentials: &PasswordCredentials) -> Result<()>;

    /// Removes the password credentials of a user, returns whether any existed.
    fn delete_password_credentials(&self, user_id: usize) -> Result<bool>;

    /// Records a login attempt against the user's credentials.
    fn mark_password_attempt(&self, user_id: usize, succeeded: bool) -> Result<()>;
}

pub trait UserStore: Send + Sync {
    /// Creates a new user and returns the user id.
    fn create_user(
        &self,
        handle: &str,
        email: &str,
        full_name: &str,
        dob: Option<NaiveDate>,
    ) -> Result<usize>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: usize) -> Result<Option<User>>;

    fn get_user_by_handle(&self, handle: &str) -> Result<Option<User>>;

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns the user's id given the handle, Ok(None) if it does not exist.
    fn get_user_id(&self, handle: &str) -> Result<Option<usize>>;

    /// Returns all users' handles.
    fn get_all_user_handles(&self) -> Result<Vec<String>>;

    /// Applies the profile fields of `update`, the password is not handled here.
    /// Returns Ok(None) if the user does not exist.
    fn update_user(&self, user_id: usize, update: &UserUpdate) -> Result<Option<User>>;
}

pub trait MoodJournalStore: Send + Sync {
    /// Writes the entry for (user, date), overwriting the mood fields and
    /// note of an existing one. The user handle must exist.
    fn upsert_mood_entry(&self, draft: &MoodEntryDraft) -> Result<MoodEntry>;

    /// Overwrites an existing entry, Ok(None) if there is none for (user, date).
    fn update_mood_entry(&self, draft: &MoodEntryDraft) -> Result<Option<MoodEntry>>;

    fn get_mood_entry(&self, user_handle: &str, date: NaiveDate) -> Result<Option<MoodEntry>>;

    /// Entries of a user, most recent date first.
    fn get_mood_entries(&self, user_handle: &str, filter: &MoodEntryFilter)
        -> Result<Vec<MoodEntry>>;
}

pub trait ChatMessageStore: Send + Sync {
    /// Appends a message to the user's transcript and returns it.
    fn append_chat_message(
        &self,
        user_id: usize,
        sender: ChatSender,
        message: &str,
    ) -> Result<ChatMessage>;

    /// The user's transcript, oldest first.
    fn get_chat_messages(&self, user_id: usize) -> Result<Vec<ChatMessage>>;
}

pub trait FullUserStore:
    UserStore + UserAuthCredentialsStore + MoodJournalStore + ChatMessageStore
{
}

impl<T> FullUserStore for T where
    T: UserStore + UserAuthCredentialsStore + MoodJournalStore + ChatMessageStore
{
}
