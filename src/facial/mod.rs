//! Client side of the external facial-emotion classifier.

mod http_classifier;

pub use http_classifier::HttpFacialClassifier;

use crate::mood::{FacialEmotion, MoodError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Label the classifier answers with when its model could not run.
pub const PREDICTION_ERROR_SENTINEL: &str = "error";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Prediction failed.")]
    PredictionFailed,

    #[error("Facial classifier unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    UnknownLabel(#[from] MoodError),
}

#[async_trait]
pub trait FacialClassifier: Send + Sync {
    /// Classifies a base64 encoded face image.
    async fn classify(&self, image_b64: &str) -> Result<FacialEmotion, ClassifierError>;
}

/// Strips an optional `data:<mime>;base64,` prefix and checks the payload
/// decodes to something non-empty.
pub fn validate_image_payload(image_b64: &str) -> Result<&str, ClassifierError> {
    let payload = match image_b64.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => image_b64,
    }
    .trim();

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| ClassifierError::InvalidImage(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ClassifierError::InvalidImage("empty image".to_string()));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_data_url_payloads() {
        assert_eq!(validate_image_payload("aGVsbG8=").unwrap(), "aGVsbG8=");
        assert_eq!(
            validate_image_payload("data:image/png;base64,aGVsbG8=").unwrap(),
            "aGVsbG8="
        );
    }

    #[test]
    fn rejects_garbage_and_empty_payloads() {
        assert!(matches!(
            validate_image_payload("not base64!!"),
            Err(ClassifierError::InvalidImage(_))
        ));
        assert!(matches!(
            validate_image_payload(""),
            Err(ClassifierError::InvalidImage(_))
        ));
    }
}
