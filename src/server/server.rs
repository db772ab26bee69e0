use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::chat_routes::chat_routes;
use super::eeg_routes::eeg_routes;
use super::facial_routes::facial_routes;
use super::journal_routes::journal_routes;
use super::metrics::metrics_handler;
use super::mood_routes::mood_routes;
use super::user_routes::user_routes;
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        user_manager: GuardedUserManager,
        chat_service: GuardedChatService,
        facial_classifier: OptionalFacialClassifier,
        eeg_feed: GuardedEegFeed,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_owned(),
            user_manager,
            chat_service,
            facial_classifier,
            eeg_feed,
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    chat_service: GuardedChatService,
    facial_classifier: OptionalFacialClassifier,
    eeg_feed: GuardedEegFeed,
) -> Result<Router> {
    let state = ServerState::new(
        config,
        user_manager,
        chat_service,
        facial_classifier,
        eeg_feed,
    );

    let moods = mood_routes().merge(journal_routes());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .nest("/v1/moods", moods)
        .nest("/v1/users", user_routes())
        .nest("/v1/chatbot", chat_routes())
        .nest("/v1/eeg", eeg_routes())
        .nest("/v1/facial_emotion", facial_routes())
        .with_state(state.clone());

    // The web and mobile clients are served from other origins.
    app = app.layer(CorsLayer::permissive());
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

pub async fn run_server(
    config: ServerConfig,
    user_manager: GuardedUserManager,
    chat_service: GuardedChatService,
    facial_classifier: OptionalFacialClassifier,
    eeg_feed: GuardedEegFeed,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(
        config,
        user_manager,
        chat_service,
        facial_classifier,
        eeg_feed,
    )?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            tracing::error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
