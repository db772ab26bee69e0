mod file_config;

pub use file_config::{ChatConfig, EegConfig, FacialConfig, FileConfig, LlmConfig};

use crate::chat::llm::{ApiKeySource, CompletionOptions};
use crate::chat::ConversationPolicy;
use crate::server::RequestsLoggingLevel;
use crate::user::DB_FILE_NAME;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub facial_url: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,

    // Collaborators, absent when not configured
    pub facial: Option<FacialSettings>,
    pub llm: Option<LlmSettings>,

    pub chat: ChatSettings,
    pub eeg: EegSettings,
}

#[derive(Debug, Clone)]
pub struct FacialSettings {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: ApiKeySource,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl LlmSettings {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub conversation_ttl: Option<Duration>,
    pub max_history_messages: usize,
    pub prune_interval: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        let policy = ConversationPolicy::default();
        Self {
            conversation_ttl: policy.ttl,
            max_history_messages: policy.max_messages,
            prune_interval: Duration::from_secs(300),
        }
    }
}

impl ChatSettings {
    pub fn conversation_policy(&self) -> ConversationPolicy {
        ConversationPolicy {
            ttl: self.conversation_ttl,
            max_messages: self.max_history_messages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EegSettings {
    pub simulate: bool,
    pub sample_interval: Duration,
}

impl Default for EegSettings {
    fn default() -> Self {
        Self {
            simulate: true,
            sample_interval: Duration::from_millis(1000),
        }
    }
}

pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_FACIAL_TIMEOUT_SEC: u64 = 30;
const DEFAULT_LLM_TIMEOUT_SEC: u64 = 60;

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Unknown logging_level '{}'", s),
            },
            None => cli.logging_level.clone(),
        };

        let facial_file = file.facial.unwrap_or_default();
        let facial = facial_file
            .url
            .or_else(|| cli.facial_url.clone())
            .map(|url| FacialSettings {
                url,
                timeout: Duration::from_secs(
                    facial_file.timeout_sec.unwrap_or(DEFAULT_FACIAL_TIMEOUT_SEC),
                ),
            });

        let llm = resolve_llm(cli, file.llm.unwrap_or_default())?;

        let chat_file = file.chat.unwrap_or_default();
        let chat_defaults = ChatSettings::default();
        let chat = ChatSettings {
            conversation_ttl: match chat_file.conversation_ttl_sec {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => chat_defaults.conversation_ttl,
            },
            max_history_messages: chat_file
                .max_history_messages
                .unwrap_or(chat_defaults.max_history_messages),
            prune_interval: chat_file
                .prune_interval_sec
                .map(Duration::from_secs)
                .unwrap_or(chat_defaults.prune_interval),
        };
        if chat.max_history_messages == 0 {
            bail!("chat.max_history_messages must be at least 1");
        }
        if chat.prune_interval.is_zero() {
            bail!("chat.prune_interval_sec must be at least 1");
        }

        let eeg_file = file.eeg.unwrap_or_default();
        let eeg_defaults = EegSettings::default();
        let eeg = EegSettings {
            simulate: eeg_file.simulate.unwrap_or(eeg_defaults.simulate),
            sample_interval: eeg_file
                .sample_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(eeg_defaults.sample_interval),
        };
        if eeg.sample_interval.is_zero() {
            bail!("eeg.sample_interval_ms must be at least 1");
        }

        Ok(Self {
            db_dir,
            port,
            metrics_port,
            logging_level,
            facial,
            llm,
            chat,
            eeg,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_dir.join(DB_FILE_NAME)
    }
}

fn resolve_llm(cli: &CliConfig, llm_file: LlmConfig) -> Result<Option<LlmSettings>> {
    let Some(base_url) = llm_file.base_url.or_else(|| cli.llm_base_url.clone()) else {
        if llm_file.api_key.is_some() || llm_file.api_key_command.is_some() {
            bail!("llm.base_url is required when an API key is configured");
        }
        return Ok(None);
    };

    let api_key = match (llm_file.api_key, llm_file.api_key_command) {
        (Some(_), Some(_)) => bail!("Only one of llm.api_key and llm.api_key_command may be set"),
        (Some(key), None) => ApiKeySource::Static(key),
        (None, Some(cmd)) => ApiKeySource::Command(cmd),
        (None, None) => ApiKeySource::None,
    };

    let defaults = CompletionOptions::default();
    let temperature = llm_file.temperature.unwrap_or(defaults.temperature);
    if !(0.0..=2.0).contains(&temperature) {
        bail!("llm.temperature must be between 0.0 and 2.0, got {}", temperature);
    }

    Ok(Some(LlmSettings {
        base_url,
        model: llm_file
            .model
            .or_else(|| cli.llm_model.clone())
            .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        api_key,
        temperature,
        max_tokens: llm_file.max_tokens.or(defaults.max_tokens),
        timeout: Duration::from_secs(llm_file.timeout_sec.unwrap_or(DEFAULT_LLM_TIMEOUT_SEC)),
    }))
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
