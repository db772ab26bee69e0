//! Mood fusion: combines a facial-expression label with the dominant EEG
//! band into one interpretation, through a fixed 7x7 table.
//!
//! Everything here is pure and reads only process-wide constant data, so it
//! can be called from any number of request handlers at once.

mod emotion;
mod error;

pub mod eeg;
pub mod fusion;
pub mod session;

pub use eeg::{dominant_band, resolve_band_state, BandStateDescriptor, EegBand, EegBandPowers};
pub use emotion::{normalize_facial, FacialEmotion, MoodIndicator, Valence};
pub use error::MoodError;
pub use fusion::{fuse, FusionEntry, FusionTable};
pub use session::{assemble, assemble_pre_resolved, AnalysisReport, AnalysisSession, SessionId};
