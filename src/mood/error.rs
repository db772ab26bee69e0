use thiserror::Error;

/// Failures of the fusion core. All of them are caused by the caller's input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoodError {
    #[error("Unknown facial emotion '{0}'")]
    UnknownEmotion(String),

    #[error("EEG band data is empty, at least one band power must be a number")]
    EmptyBandData,

    #[error("Unknown EEG band '{0}'")]
    UnknownBand(String),
}
