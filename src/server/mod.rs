mod chat_routes;
pub mod config;
mod eeg_routes;
pub mod error;
mod extract;
mod facial_routes;
mod http_layers;
mod journal_routes;
pub mod metrics;
mod mood_routes;
pub mod server;
pub mod state;
mod user_routes;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http_layers::*;
pub use server::{make_app, run_server};
