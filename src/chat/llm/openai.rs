//! OpenAI-compatible chat completions client.
//!
//! Works with OpenAI, OpenRouter, a local Ollama/vLLM and anything else that
//! speaks the `/chat/completions` protocol.

use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the bearer token comes from.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    None,
    Static(String),
    /// Shell command printing the key on stdout, run before every request.
    Command(String),
}

impl ApiKeySource {
    async fn get_key(&self) -> Result<Option<String>, LlmError> {
        match self {
            ApiKeySource::None => Ok(None),
            ApiKeySource::Static(key) => Ok(Some(key.clone())),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let result = tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "api_key_command failed to execute");
                        return Err(LlmError::Connection(format!(
                            "Failed to execute api_key_command: {}",
                            e
                        )));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(LlmError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(command = %cmd, stderr = %stderr, "api_key_command failed");
                    return Err(LlmError::Connection(format!(
                        "api_key_command failed with status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    return Err(LlmError::Connection(
                        "api_key_command returned empty key".to_string(),
                    ));
                }

                Ok(Some(key))
            }
        }
    }
}

pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
}

impl OpenAIProvider {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_source: ApiKeySource,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key_source,
        }
    }

    fn map_send_error(e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = OpenAIChatRequest {
            model: &self.model,
            messages: messages.iter().map(OpenAIMessage::from).collect(),
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
        };

        debug!(
            model = %self.model,
            message_count = messages.len(),
            "Sending completion request"
        );

        let mut req_builder = self.client.post(&url).json(&request);
        if let Some(api_key) = self.api_key_source.get_key().await? {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder
            .timeout(options.timeout)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let openai_response: OpenAIChatResponse = response.json().await.map_err(|e| {
            LlmError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse("Empty completion".to_string()));
        }

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::MaxTokens,
            Some("error") => FinishReason::Error,
            _ => FinishReason::Stop,
        };

        let usage = openai_response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        debug!(finish_reason = ?finish_reason, "Received completion response");

        Ok(CompletionResponse {
            message: Message::assistant(content),
            finish_reason,
            usage,
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let url = format!("{}/models", self.base_url);

        let mut req_builder = self.client.get(&url).timeout(Duration::from_secs(5));
        if let Some(api_key) = self.api_key_source.get_key().await? {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await.map_err(Self::map_send_error)?;
        if !response.status().is_success() {
            return Err(LlmError::Api {
                status: response.status().as_u16(),
                message: "Health check failed".to_string(),
            });
        }

        Ok(())
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: MessageRole,
    content: &'a str,
}

impl<'a> From<&'a Message> for OpenAIMessage<'a> {
    fn from(msg: &'a Message) -> Self {
        OpenAIMessage {
            role: msg.role,
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_in_chat_completions_shape() {
        let messages = vec![Message::system("be kind"), Message::user("hello")];
        let request = OpenAIChatRequest {
            model: "gpt-4o-mini",
            messages: messages.iter().map(OpenAIMessage::from).collect(),
            temperature: Some(0.5),
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn response_parses_without_usage() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hi"},"finish_reason":"stop"}]}"#;
        let parsed: OpenAIChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hi"));
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        let provider = OpenAIProvider::new("http://localhost:11434/v1/", "m", ApiKeySource::None);
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
    }

    #[tokio::test]
    async fn key_command_output_is_trimmed() {
        let source = ApiKeySource::Command("echo '  secret  '".to_string());
        assert_eq!(source.get_key().await.unwrap().as_deref(), Some("secret"));
    }

    #[tokio::test]
    async fn failing_key_command_is_a_connection_error() {
        let source = ApiKeySource::Command("exit 3".to_string());
        assert!(matches!(
            source.get_key().await,
            Err(LlmError::Connection(_))
        ));
    }
}
