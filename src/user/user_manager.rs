use super::{
    ChatMessage, ChatSender, FullUserStore, MoodEntry, MoodEntryDraft, MoodEntryFilter, NewUser,
    PasswordCredentials, UniqueUserField, User, UserUpdate, MAX_JOURNAL_PAGE,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    HandleTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Mood entry not found")]
    MoodEntryNotFound,

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type UserResult<T> = std::result::Result<T, UserError>;

/// A concurrent writer can take an email or handle between the uniqueness
/// check and the write; the store then reports the collision.
fn map_write_error(err: anyhow::Error) -> UserError {
    match err.downcast_ref::<UniqueUserField>() {
        Some(UniqueUserField::Email) => UserError::EmailTaken,
        Some(UniqueUserField::Handle) => UserError::HandleTaken,
        None => UserError::Store(err),
    }
}

fn validate_handle(handle: &str) -> UserResult<()> {
    if handle.trim().is_empty() {
        return Err(UserError::Invalid("The username cannot be empty.".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> UserResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(UserError::Invalid(format!("Invalid email address '{}'.", email))),
    }
}

fn validate_password(password: &str) -> UserResult<()> {
    if password.is_empty() {
        return Err(UserError::Invalid("The password cannot be empty.".to_string()));
    }
    Ok(())
}

pub struct UserManager {
    user_store: Arc<dyn FullUserStore>,
}

impl UserManager {
    pub fn new(user_store: Arc<dyn FullUserStore>) -> Self {
        Self { user_store }
    }

    /// Creates a user with a password. Email and handle must both be unused.
    pub fn sign_up(&self, new_user: &NewUser) -> UserResult<User> {
        validate_handle(&new_user.handle)?;
        validate_email(&new_user.email)?;
        validate_password(&new_user.password)?;

        if self.user_store.get_user_by_email(&new_user.email)?.is_some() {
            return Err(UserError::EmailTaken);
        }
        if self.user_store.get_user_id(&new_user.handle)?.is_some() {
            return Err(UserError::HandleTaken);
        }

        let user_id = self
            .user_store
            .create_user(
                &new_user.handle,
                &new_user.email,
                &new_user.full_name,
                new_user.dob,
            )
            .map_err(map_write_error)?;
        self.user_store
            .set_password_credentials(&PasswordCredentials::create(user_id, &new_user.password)?)?;
        info!("Created user {} ({})", new_user.handle, user_id);
        self.get_user(user_id)
    }

    /// Checks an email/password pair and returns the matching profile.
    pub fn login(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .user_store
            .get_user_by_email(email)?
            .ok_or(UserError::InvalidCredentials)?;
        let credentials = self
            .user_store
            .get_password_credentials(user.id)?
            .ok_or(UserError::InvalidCredentials)?;

        let valid = credentials.verify(password)?;
        if let Err(err) = self.user_store.mark_password_attempt(user.id, valid) {
            warn!("Could not record login attempt of {}: {}", user.handle, err);
        }
        if !valid {
            return Err(UserError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn get_user(&self, user_id: usize) -> UserResult<User> {
        self.user_store
            .get_user(user_id)?
            .ok_or(UserError::UserNotFound)
    }

    pub fn get_user_by_handle(&self, handle: &str) -> UserResult<User> {
        self.user_store
            .get_user_by_handle(handle)?
            .ok_or(UserError::UserNotFound)
    }

    pub fn get_all_user_handles(&self) -> UserResult<Vec<String>> {
        Ok(self.user_store.get_all_user_handles()?)
    }

    pub fn update_user(&self, user_id: usize, update: &UserUpdate) -> UserResult<User> {
        let current = self.get_user(user_id)?;

        if let Some(handle) = update.handle.as_deref() {
            validate_handle(handle)?;
            if handle != current.handle && self.user_store.get_user_id(handle)?.is_some() {
                return Err(UserError::HandleTaken);
            }
        }
        if let Some(email) = update.email.as_deref() {
            validate_email(email)?;
            if email != current.email && self.user_store.get_user_by_email(email)?.is_some() {
                return Err(UserError::EmailTaken);
            }
        }
        if let Some(password) = update.password.as_deref() {
            validate_password(password)?;
        }

        let user = self
            .user_store
            .update_user(user_id, update)
            .map_err(map_write_error)?
            .ok_or(UserError::UserNotFound)?;
        if let Some(password) = update.password.as_deref() {
            self.set_password(user_id, password)?;
        }
        Ok(user)
    }

    pub fn set_password(&self, user_id: usize, password: &str) -> UserResult<()> {
        validate_password(password)?;
        self.user_store
            .set_password_credentials(&PasswordCredentials::create(user_id, password)?)?;
        Ok(())
    }

    /// Returns whether the password matches, without recording the attempt.
    pub fn check_password(&self, user_id: usize, password: &str) -> UserResult<bool> {
        match self.user_store.get_password_credentials(user_id)? {
            Some(credentials) => Ok(credentials.verify(password)?),
            None => Ok(false),
        }
    }

    pub fn save_mood_entry(&self, draft: &MoodEntryDraft) -> UserResult<MoodEntry> {
        self.get_user_by_handle(&draft.user_id)?;
        Ok(self.user_store.upsert_mood_entry(draft)?)
    }

    pub fn update_mood_entry(&self, draft: &MoodEntryDraft) -> UserResult<MoodEntry> {
        self.get_user_by_handle(&draft.user_id)?;
        self.user_store
            .update_mood_entry(draft)?
            .ok_or(UserError::MoodEntryNotFound)
    }

    pub fn mood_entries(
        &self,
        user_handle: &str,
        filter: &MoodEntryFilter,
    ) -> UserResult<Vec<MoodEntry>> {
        if filter.limit == 0 || filter.limit > MAX_JOURNAL_PAGE {
            return Err(UserError::Invalid(format!(
                "limit must be between 1 and {}",
                MAX_JOURNAL_PAGE
            )));
        }
        self.get_user_by_handle(user_handle)?;
        Ok(self.user_store.get_mood_entries(user_handle, filter)?)
    }

    pub fn append_chat_message(
        &self,
        user_id: usize,
        sender: ChatSender,
        message: &str,
    ) -> UserResult<ChatMessage> {
        Ok(self
            .user_store
            .append_chat_message(user_id, sender, message)?)
    }

    pub fn chat_messages(&self, user_handle: &str) -> UserResult<Vec<ChatMessage>> {
        let user = self.get_user_by_handle(user_handle)?;
        Ok(self.user_store.get_chat_messages(user.id)?)
    }
}
