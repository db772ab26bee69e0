use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::debug;

use crate::mood::eeg::{band_power_shares, dominant_band, BandPowerShare};
use crate::mood::EegBandPowers;
use crate::server::error::{ApiError, ApiResult};
use crate::server::extract::ApiJson;
use crate::server::state::{GuardedEegFeed, ServerState};

/// Share of each band in the latest sample; empty before the first one.
async fn band_power(State(eeg_feed): State<GuardedEegFeed>) -> Json<Vec<BandPowerShare>> {
    let shares = eeg_feed
        .latest()
        .map(|powers| band_power_shares(&powers))
        .unwrap_or_default();
    Json(shares)
}

/// Ingests a sample from an acquisition client and answers with its shares.
async fn push_band_power(
    State(eeg_feed): State<GuardedEegFeed>,
    ApiJson(sample): ApiJson<EegBandPowers>,
) -> ApiResult<Json<Vec<BandPowerShare>>> {
    let dominant = dominant_band(&sample)?;
    if !eeg_feed.push(sample) {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            "The EEG feed does not accept pushed samples",
        ));
    }
    debug!("Pushed EEG sample, dominant band {}", dominant.as_str());
    Ok(Json(band_power_shares(&sample)))
}

pub fn eeg_routes() -> Router<ServerState> {
    Router::new().route("/bandpower", get(band_power).post(push_band_power))
}
