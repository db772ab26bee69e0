use super::conversation::ConversationStore;
use super::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use super::prompt::build_messages;
use crate::server::metrics;
use crate::user::{ChatMessage, ChatSender, UserError, UserManager};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Invalid(String),

    #[error("The chat agent is not configured")]
    AgentUnavailable,

    #[error("Chatbot error: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Store(anyhow::Error),
}

impl From<UserError> for ChatError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::UserNotFound => ChatError::UserNotFound,
            UserError::Invalid(msg) => ChatError::Invalid(msg),
            UserError::Store(e) => ChatError::Store(e),
            other => ChatError::Store(anyhow::anyhow!(other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    /// Id of the persisted bot message, absent when persisting failed.
    pub message_id: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumedConversation {
    pub session: Vec<ChatMessage>,
    pub memory_session: Vec<Message>,
    pub total_messages: usize,
}

pub struct ChatService {
    provider: Option<Arc<dyn LlmProvider>>,
    conversations: Arc<ConversationStore>,
    options: CompletionOptions,
    user_manager: Arc<UserManager>,
}

impl ChatService {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        conversations: Arc<ConversationStore>,
        options: CompletionOptions,
        user_manager: Arc<UserManager>,
    ) -> Self {
        Self {
            provider,
            conversations,
            options,
            user_manager,
        }
    }

    pub fn conversations(&self) -> &Arc<ConversationStore> {
        &self.conversations
    }

    pub fn provider(&self) -> Option<&Arc<dyn LlmProvider>> {
        self.provider.as_ref()
    }

    pub async fn send(&self, user_handle: &str, message: &str) -> Result<ChatReply, ChatError> {
        let user = self.user_manager.get_user_by_handle(user_handle)?;
        if message.trim().is_empty() {
            return Err(ChatError::Invalid("The message cannot be empty.".to_string()));
        }
        let provider = self.provider.as_ref().ok_or(ChatError::AgentUnavailable)?;

        let history = self.conversations.history(user_handle);
        let prompt = build_messages(&history, message);

        let start = Instant::now();
        let completion = provider.complete(&prompt, &self.options).await;
        let outcome = if completion.is_ok() { "success" } else { "error" };
        metrics::record_chat_completion(provider.name(), outcome, start.elapsed());
        let completion = completion?;

        if let Some(usage) = completion.usage {
            debug!(
                user = %user_handle,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion usage"
            );
        }

        let reply = completion.message.content.trim().to_string();
        self.conversations.append(
            user_handle,
            [Message::user(message), Message::assistant(reply.clone())],
        );

        let persisted = self
            .user_manager
            .append_chat_message(user.id, ChatSender::User, message)
            .and_then(|_| {
                self.user_manager
                    .append_chat_message(user.id, ChatSender::Bot, &reply)
            });

        Ok(match persisted {
            Ok(bot_message) => ChatReply {
                reply,
                message_id: Some(bot_message.id),
                timestamp: bot_message.timestamp,
            },
            Err(e) => {
                warn!("Failed to persist chat messages for {}: {}", user_handle, e);
                ChatReply {
                    reply,
                    message_id: None,
                    timestamp: Utc::now(),
                }
            }
        })
    }

    /// Starts over: forgets the in-memory conversation. Persisted history is kept.
    pub fn new_conversation(&self, user_handle: &str) -> Result<(), ChatError> {
        self.user_manager.get_user_by_handle(user_handle)?;
        self.conversations.clear(user_handle);
        Ok(())
    }

    pub fn history(&self, user_handle: &str) -> Result<Vec<ChatMessage>, ChatError> {
        Ok(self.user_manager.chat_messages(user_handle)?)
    }

    /// Persisted history plus whatever the in-memory conversation still holds.
    pub fn resume(&self, user_handle: &str) -> Result<ResumedConversation, ChatError> {
        let session = self.history(user_handle)?;
        let memory_session = self.conversations.history(user_handle);
        Ok(ResumedConversation {
            total_messages: session.len(),
            session,
            memory_session,
        })
    }

    /// Stores a mood-seeded opening line as a bot message and makes it part
    /// of the running conversation.
    pub fn mood_chat(&self, user_handle: &str, message: &str) -> Result<ChatMessage, ChatError> {
        let user = self.user_manager.get_user_by_handle(user_handle)?;
        if message.trim().is_empty() {
            return Err(ChatError::Invalid("The message cannot be empty.".to_string()));
        }
        let stored = self
            .user_manager
            .append_chat_message(user.id, ChatSender::Bot, message)?;
        self.conversations
            .append(user_handle, [Message::assistant(message)]);
        Ok(stored)
    }
}
