pub mod auth;
mod sqlite_user_store;
mod user_manager;
pub mod user_models;
mod user_store;

pub use auth::{PasswordCredentials, PasswordHasher};
pub use sqlite_user_store::{SqliteUserStore, DB_FILE_NAME};
pub use user_manager::{UserError, UserManager, UserResult};
pub use user_models::{
    ChatMessage, ChatSender, MoodEntry, MoodEntryDraft, MoodEntryFilter, NewUser, User,
    UserUpdate, DEFAULT_JOURNAL_PAGE, MAX_JOURNAL_PAGE,
};
pub use user_store::{
    ChatMessageStore, FullUserStore, MoodJournalStore, UniqueUserField, UserAuthCredentialsStore,
    UserStore,
};
