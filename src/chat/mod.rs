//! Buddy, the companion chat agent.

mod conversation;
pub mod llm;
mod prompt;
mod service;

pub use conversation::{Clock, ConversationPolicy, ConversationStore};
pub use prompt::{build_messages, detect_emotion, emotion_context, SYSTEM_INSTRUCTION};
pub use service::{ChatError, ChatReply, ChatService, ResumedConversation};
