//! Mood Fusion Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod chat;
pub mod config;
pub mod eeg_feed;
pub mod facial;
pub mod mood;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

// Re-export commonly used types for convenience
pub use chat::{ChatService, ConversationStore};
pub use eeg_feed::{EegFeed, FixedEegFeed, SimulatedEegFeed};
pub use facial::{FacialClassifier, HttpFacialClassifier};
pub use server::{make_app, run_server, RequestsLoggingLevel};
pub use user::{SqliteUserStore, UserManager};
