//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and fake upstreams.

use super::constants::*;
use super::fakes::{spawn_fake_classifier, spawn_fake_llm, FakeService};
use super::fixtures::create_test_db_with_users;
use mood_fusion_server::chat::llm::{
    ApiKeySource, CompletionOptions, LlmProvider, OpenAIProvider,
};
use mood_fusion_server::chat::{ChatService, ConversationPolicy, ConversationStore};
use mood_fusion_server::eeg_feed::{EegFeed, FixedEegFeed};
use mood_fusion_server::facial::{FacialClassifier, HttpFacialClassifier};
use mood_fusion_server::mood::EegBandPowers;
use mood_fusion_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use mood_fusion_server::user::{SqliteUserStore, UserManager};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Which collaborators the test server is wired with
pub struct TestServerOptions {
    pub with_llm: bool,
    pub with_facial: bool,
    pub eeg_sample: Option<EegBandPowers>,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        let [alpha, beta, theta, delta, gamma] = FEED_SAMPLE;
        Self {
            with_llm: true,
            with_facial: true,
            eeg_sample: Some(EegBandPowers::new(alpha, beta, theta, delta, gamma)),
        }
    }
}

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// User manager for direct database access in tests
    pub user_manager: Arc<UserManager>,

    /// The EEG feed behind /v1/eeg and /v1/moods/analyze/live
    pub eeg_feed: Arc<FixedEegFeed>,

    /// Fake chat completion API, when configured
    pub llm: Option<FakeService>,

    /// Fake facial classifier, when configured
    pub classifier: Option<FakeService>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with every collaborator configured
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary database with test users
    /// 2. Starts the fake upstream services that were asked for
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if any of the steps above fails.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let (temp_db_dir, db_path) =
            create_test_db_with_users().expect("Failed to create test database");

        let user_store = SqliteUserStore::new(&db_path).expect("Failed to open user store");
        let user_manager = Arc::new(UserManager::new(Arc::new(user_store)));

        let llm = if options.with_llm {
            Some(spawn_fake_llm().await)
        } else {
            None
        };
        let provider: Option<Arc<dyn LlmProvider>> = llm.as_ref().map(|fake| {
            Arc::new(OpenAIProvider::new(
                fake.base_url.clone(),
                "fake-model",
                ApiKeySource::Static("test-key".to_string()),
            )) as Arc<dyn LlmProvider>
        });
        let chat_service = Arc::new(ChatService::new(
            provider,
            Arc::new(ConversationStore::new(ConversationPolicy::default())),
            CompletionOptions::default(),
            user_manager.clone(),
        ));

        let classifier = if options.with_facial {
            Some(spawn_fake_classifier().await)
        } else {
            None
        };
        let facial_classifier: Option<Arc<dyn FacialClassifier>> =
            classifier.as_ref().map(|fake| {
                Arc::new(
                    HttpFacialClassifier::new(fake.base_url.clone(), Duration::from_secs(5))
                        .expect("Failed to build facial classifier"),
                ) as Arc<dyn FacialClassifier>
            });

        let eeg_feed = Arc::new(FixedEegFeed::new(options.eeg_sample));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
        };

        let app = make_app(
            config,
            user_manager.clone(),
            chat_service,
            facial_classifier,
            eeg_feed.clone() as Arc<dyn EegFeed>,
        )
        .expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            user_manager,
            eeg_feed,
            llm,
            classifier,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir and fake services clean up on their own drop
    }
}
