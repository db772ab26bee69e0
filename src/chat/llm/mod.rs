//! LLM provider abstraction used by the companion chat.

mod openai;
mod provider;
mod types;

pub use openai::{ApiKeySource, OpenAIProvider};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
