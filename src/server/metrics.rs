use crate::mood::fusion::fusion_gap_count;
use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all metrics of this server
const PREFIX: &str = "mood_fusion";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "path", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Mood Analysis Metrics
    pub static ref MOOD_ANALYSES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_mood_analyses_total"), "Completed mood analyses"),
        &["facial_emotion", "dominant_band"]
    ).expect("Failed to create mood_analyses_total metric");

    pub static ref FUSION_TABLE_GAPS_TOTAL: IntCounter = IntCounter::new(
        format!("{PREFIX}_fusion_table_gaps_total"),
        "Fusion lookups that fell back to a synthesized entry"
    ).expect("Failed to create fusion_table_gaps_total metric");

    // Collaborator Metrics
    pub static ref FACIAL_CLASSIFICATIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_facial_classifications_total"), "Facial classifier calls"),
        &["outcome"]
    ).expect("Failed to create facial_classifications_total metric");

    pub static ref CHAT_COMPLETIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_chat_completions_total"), "Chat completions requested"),
        &["provider", "outcome"]
    ).expect("Failed to create chat_completions_total metric");

    pub static ref CHAT_COMPLETION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_chat_completion_duration_seconds"),
            "Chat completion duration in seconds"
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0])
    ).expect("Failed to create chat_completion_duration_seconds metric");

    pub static ref CHAT_ACTIVE_CONVERSATIONS: IntGauge = IntGauge::new(
        format!("{PREFIX}_chat_active_conversations"),
        "Conversations currently held in memory"
    ).expect("Failed to create chat_active_conversations metric");

    // Authentication Metrics
    pub static ref AUTH_LOGIN_ATTEMPTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_auth_login_attempts_total"), "Total login attempts"),
        &["status"]
    ).expect("Failed to create auth_login_attempts_total metric");

    pub static ref AUTH_LOGIN_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_auth_login_duration_seconds"),
            "Login request duration in seconds"
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0])
    ).expect("Failed to create auth_login_duration_seconds metric");

    // Error Metrics
    pub static ref ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_errors_total"), "Total errors by type and endpoint"),
        &["error_type", "endpoint"]
    ).expect("Failed to create errors_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(MOOD_ANALYSES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(FUSION_TABLE_GAPS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(FACIAL_CLASSIFICATIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CHAT_COMPLETIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CHAT_COMPLETION_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CHAT_ACTIVE_CONVERSATIONS.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGIN_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGIN_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration.as_secs_f64());
}

pub fn record_mood_analysis(facial_emotion: &str, dominant_band: &str) {
    MOOD_ANALYSES_TOTAL
        .with_label_values(&[facial_emotion, dominant_band])
        .inc();
}

pub fn record_facial_classification(outcome: &str) {
    FACIAL_CLASSIFICATIONS_TOTAL
        .with_label_values(&[outcome])
        .inc();
}

pub fn record_chat_completion(provider: &str, outcome: &str, duration: Duration) {
    CHAT_COMPLETIONS_TOTAL
        .with_label_values(&[provider, outcome])
        .inc();

    CHAT_COMPLETION_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn set_active_conversations(count: usize) {
    CHAT_ACTIVE_CONVERSATIONS.set(count as i64);
}

/// Record a login attempt
pub fn record_login_attempt(status: &str, duration: Duration) {
    AUTH_LOGIN_ATTEMPTS_TOTAL
        .with_label_values(&[status])
        .inc();

    AUTH_LOGIN_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record an error
pub fn record_error(error_type: &str, endpoint: &str) {
    ERRORS_TOTAL
        .with_label_values(&[error_type, endpoint])
        .inc();
}

/// Catches the exported counter up with the fusion table's own gap count.
pub fn sync_fusion_gaps() {
    let exported = FUSION_TABLE_GAPS_TOTAL.get();
    let observed = fusion_gap_count();
    if observed > exported {
        FUSION_TABLE_GAPS_TOTAL.inc_by(observed - exported);
    }
}

/// Update process memory usage
pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            for line in status.lines() {
                if line.starts_with("VmRSS:") {
                    // RSS is reported in kB
                    if let Some(kb_str) = line.split_whitespace().nth(1) {
                        if let Ok(kb) = kb_str.parse::<f64>() {
                            PROCESS_MEMORY_BYTES.set(kb * 1024.0);
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();
    sync_fusion_gaps();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
