use super::{validate_image_payload, ClassifierError, FacialClassifier, PREDICTION_ERROR_SENTINEL};
use crate::mood::{normalize_facial, FacialEmotion};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct PredictRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    prediction: Option<String>,
    error: Option<String>,
}

/// Talks to a classifier service exposing `POST {base_url}/predict`.
#[derive(Clone)]
pub struct HttpFacialClassifier {
    client: Client,
    base_url: String,
}

impl HttpFacialClassifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FacialClassifier for HttpFacialClassifier {
    async fn classify(&self, image_b64: &str) -> Result<FacialEmotion, ClassifierError> {
        let image = validate_image_payload(image_b64)?;

        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { image })
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Unavailable(format!("invalid response: {}", e)))?;

        if status == StatusCode::BAD_REQUEST {
            return Err(ClassifierError::InvalidImage(
                body.error.unwrap_or_else(|| "rejected by classifier".to_string()),
            ));
        }

        match body.prediction {
            Some(label) if label == PREDICTION_ERROR_SENTINEL => {
                Err(ClassifierError::PredictionFailed)
            }
            Some(label) => {
                debug!("Classifier predicted '{}'", label);
                Ok(normalize_facial(&label)?)
            }
            None if status.is_server_error() => Err(ClassifierError::PredictionFailed),
            None => Err(ClassifierError::Unavailable(format!(
                "classifier answered {} without a prediction",
                status
            ))),
        }
    }
}
