use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mood_fusion_server::chat::llm::{LlmProvider, OpenAIProvider};
use mood_fusion_server::chat::{ChatService, ConversationStore};
use mood_fusion_server::config;
use mood_fusion_server::eeg_feed::{EegFeed, FixedEegFeed, SimulatedEegFeed};
use mood_fusion_server::facial::{FacialClassifier, HttpFacialClassifier};
use mood_fusion_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};
use mood_fusion_server::user::{SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the mood database (mood.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the facial emotion classifier. Facial routes answer 503 without it.
    #[clap(long)]
    pub facial_url: Option<String>,

    /// Base URL of an OpenAI compatible chat completion API. The chatbot answers 503 without it.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Model requested from the chat completion API.
    #[clap(long)]
    pub llm_model: Option<String>,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            facial_url: args.facial_url.clone(),
            llm_base_url: args.llm_base_url.clone(),
            llm_model: args.llm_model.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);

    info!("Initializing metrics...");
    metrics::init_metrics();

    if !app_config.db_path().exists() {
        info!("Creating new mood database at {:?}", app_config.db_path());
    }
    let user_store = Arc::new(SqliteUserStore::new(app_config.db_path())?);
    let user_manager = Arc::new(UserManager::new(user_store));

    let provider: Option<Arc<dyn LlmProvider>> = match &app_config.llm {
        Some(llm) => {
            info!("Chatbot backed by {} at {}", llm.model, llm.base_url);
            Some(Arc::new(OpenAIProvider::new(
                llm.base_url.clone(),
                llm.model.clone(),
                llm.api_key.clone(),
            )) as Arc<dyn LlmProvider>)
        }
        None => {
            warn!("No LLM configured, the chatbot is disabled");
            None
        }
    };
    if let Some(provider) = &provider {
        match provider.health_check().await {
            Ok(()) => info!("LLM provider {} is reachable", provider.name()),
            Err(e) => warn!("LLM provider {} health check failed: {}", provider.name(), e),
        }
    }
    let completion_options = app_config
        .llm
        .as_ref()
        .map(|llm| llm.completion_options())
        .unwrap_or_default();

    let conversations = Arc::new(ConversationStore::new(
        app_config.chat.conversation_policy(),
    ));
    if app_config.chat.conversation_ttl.is_some() {
        let pruning_conversations = conversations.clone();
        let interval = app_config.chat.prune_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let pruned = pruning_conversations.prune_expired();
                if pruned > 0 {
                    info!("Pruned {} idle conversations", pruned);
                }
                metrics::set_active_conversations(pruning_conversations.len());
            }
        });
    }

    let chat_service = Arc::new(ChatService::new(
        provider,
        conversations,
        completion_options,
        user_manager.clone(),
    ));

    let facial_classifier: Option<Arc<dyn FacialClassifier>> = match &app_config.facial {
        Some(facial) => {
            info!("Facial classifier configured at {}", facial.url);
            Some(Arc::new(HttpFacialClassifier::new(
                facial.url.clone(),
                facial.timeout,
            )?) as Arc<dyn FacialClassifier>)
        }
        None => {
            warn!("No facial classifier configured");
            None
        }
    };

    let eeg_feed: Arc<dyn EegFeed> = if app_config.eeg.simulate {
        info!(
            "Simulating EEG band powers every {:?}",
            app_config.eeg.sample_interval
        );
        let feed = Arc::new(SimulatedEegFeed::new());
        feed.spawn(app_config.eeg.sample_interval);
        feed as Arc<dyn EegFeed>
    } else {
        info!("EEG samples are expected on POST /v1/eeg/bandpower");
        Arc::new(FixedEegFeed::new(None)) as Arc<dyn EegFeed>
    };

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
    };

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    run_server(
        server_config,
        user_manager,
        chat_service,
        facial_classifier,
        eeg_feed,
    )
    .await
}
