use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::mood::FacialEmotion;
use crate::server::error::{ApiError, ApiResult};
use crate::server::extract::ApiJson;
use crate::server::metrics::record_facial_classification;
use crate::server::state::{OptionalFacialClassifier, ServerState};

#[derive(Deserialize)]
pub struct ImageBody {
    /// Base64 encoded face crop, optionally as a data URL.
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: FacialEmotion,
}

async fn classify(
    State(classifier): State<OptionalFacialClassifier>,
    ApiJson(body): ApiJson<ImageBody>,
) -> ApiResult<Json<PredictionResponse>> {
    let classifier = classifier
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("Facial classifier not configured"))?;

    match classifier.classify(&body.image).await {
        Ok(prediction) => {
            record_facial_classification("success");
            Ok(Json(PredictionResponse { prediction }))
        }
        Err(e) => {
            record_facial_classification("error");
            Err(e.into())
        }
    }
}

pub fn facial_routes() -> Router<ServerState> {
    Router::new().route("/", post(classify))
}
