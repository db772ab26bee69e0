use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::eeg::{dominant_band, parse_band, resolve_band_state, BandStateDescriptor, EegBand};
use super::fusion::{combined_mood_key, fuse, FusionEntry};
use super::{normalize_facial, EegBandPowers, FacialEmotion, MoodError, Valence};

/// Strength reported for a pre-resolved band when the caller gives none.
pub const DEFAULT_BAND_STRENGTH: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// `session_{unix millis}_{8 random hex chars}`
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        SessionId(format!(
            "session_{}_{}",
            Utc::now().timestamp_millis(),
            &suffix[..8]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fusion of a facial reading with an EEG reading.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    session_id: SessionId,
    facial_emotion: FacialEmotion,
    eeg_dominant_band: EegBand,
    eeg_state: &'static BandStateDescriptor,
    fusion: FusionEntry,
    raw_eeg_powers: Option<EegBandPowers>,
    band_strength: f64,
    created_at: DateTime<Utc>,
}

/// Fuses a facial label with raw band powers.
pub fn assemble(
    facial_emotion: &str,
    eeg_powers: &EegBandPowers,
) -> Result<AnalysisSession, MoodError> {
    let facial = normalize_facial(facial_emotion)?;
    let band = dominant_band(eeg_powers)?;
    let strength = eeg_powers.get(band).unwrap_or(DEFAULT_BAND_STRENGTH);
    Ok(AnalysisSession::build(facial, band, Some(*eeg_powers), strength))
}

/// Fuses a facial label with a dominant band the caller already knows.
pub fn assemble_pre_resolved(
    facial_emotion: &str,
    dominant_eeg_band: &str,
    band_strength: Option<f64>,
) -> Result<AnalysisSession, MoodError> {
    let facial = normalize_facial(facial_emotion)?;
    let band = parse_band(dominant_eeg_band)?;
    Ok(AnalysisSession::build(
        facial,
        band,
        None,
        band_strength.unwrap_or(DEFAULT_BAND_STRENGTH),
    ))
}

impl AnalysisSession {
    fn build(
        facial: FacialEmotion,
        band: EegBand,
        raw_eeg_powers: Option<EegBandPowers>,
        band_strength: f64,
    ) -> Self {
        let eeg_state = resolve_band_state(band);
        Self {
            session_id: SessionId::generate(),
            facial_emotion: facial,
            eeg_dominant_band: band,
            eeg_state,
            fusion: fuse(facial, eeg_state.mood_indicator),
            raw_eeg_powers,
            band_strength,
            created_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn facial_emotion(&self) -> FacialEmotion {
        self.facial_emotion
    }

    pub fn eeg_dominant_band(&self) -> EegBand {
        self.eeg_dominant_band
    }

    pub fn eeg_state(&self) -> &'static BandStateDescriptor {
        self.eeg_state
    }

    pub fn fusion(&self) -> &FusionEntry {
        &self.fusion
    }

    pub fn raw_eeg_powers(&self) -> Option<&EegBandPowers> {
        self.raw_eeg_powers.as_ref()
    }

    pub fn band_strength(&self) -> f64 {
        self.band_strength
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn combined_mood(&self) -> String {
        combined_mood_key(self.facial_emotion, self.eeg_state.mood_indicator)
    }

    pub fn report(&self) -> AnalysisReport {
        let state = self.eeg_state;
        AnalysisReport {
            session_id: self.session_id.clone(),
            facial_analysis: FacialAnalysis {
                emotion: self.facial_emotion,
                title: self.facial_emotion.title(),
                color: self.facial_emotion.color(),
                valence: self.facial_emotion.valence(),
            },
            eeg_analysis: EegAnalysis {
                dominant_band: self.eeg_dominant_band.as_str(),
                emotional_state: state.emotional_state,
                mood_indicator: state.mood_indicator.title(),
                color: state.color,
                description: state.description,
            },
            combined_analysis: CombinedAnalysis {
                title: self.fusion.title.to_string(),
                interpretation: self.fusion.interpretation.to_string(),
                combined_mood: self.combined_mood(),
                eeg_emotional_state: state.emotional_state,
                eeg_color: state.color,
                chat_ask: self.fusion.chat_ask.to_string(),
                chatbot_prompt: self.fusion.chatbot_prompt.to_string(),
            },
            raw_data: RawEegData {
                eeg_frequencies: self.raw_eeg_powers,
                dominant_frequency: self.eeg_dominant_band.key(),
                frequency_strength: self.band_strength,
            },
            timestamp: self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Wire shape of an analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub session_id: SessionId,
    pub facial_analysis: FacialAnalysis,
    pub eeg_analysis: EegAnalysis,
    pub combined_analysis: CombinedAnalysis,
    pub raw_data: RawEegData,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacialAnalysis {
    pub emotion: FacialEmotion,
    pub title: &'static str,
    pub color: &'static str,
    pub valence: Valence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EegAnalysis {
    pub dominant_band: &'static str,
    pub emotional_state: &'static str,
    pub mood_indicator: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedAnalysis {
    pub title: String,
    pub interpretation: String,
    pub combined_mood: String,
    pub eeg_emotional_state: &'static str,
    pub eeg_color: &'static str,
    #[serde(rename = "chatAsk")]
    pub chat_ask: String,
    #[serde(rename = "chatbotPrompt")]
    pub chatbot_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawEegData {
    pub eeg_frequencies: Option<EegBandPowers>,
    pub dominant_frequency: &'static str,
    pub frequency_strength: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[test]
    fn happy_face_with_alpha_is_authentic_joy() {
        let session = assemble("happy", &EegBandPowers::new(5.0, 2.0, 1.0, 1.0, 1.0)).unwrap();
        assert_eq!(session.eeg_dominant_band(), EegBand::Alpha);
        assert_eq!(session.eeg_state().mood_indicator, FacialEmotion::Happy);
        assert_eq!(session.fusion().title, "Authentic Joy");
        assert_eq!(session.fusion().chat_ask, "What's making you so happy?");
        assert_eq!(session.combined_mood(), "happy_happy");
        assert_eq!(session.band_strength(), 5.0);
    }

    #[test]
    fn sad_face_with_beta_is_frustrated_grief() {
        let session = assemble("Sad", &EegBandPowers::new(1.0, 30.0, 1.0, 1.0, 1.0)).unwrap();
        assert_eq!(session.eeg_dominant_band(), EegBand::Beta);
        assert_eq!(session.eeg_state().mood_indicator, FacialEmotion::Angry);
        assert_eq!(session.fusion().title, "Frustrated Grief");
        assert_eq!(session.facial_emotion(), FacialEmotion::Sad);
    }

    #[test]
    fn unknown_emotion_fails_before_band_data_is_read() {
        let err = assemble("ecstatic", &EegBandPowers::default()).unwrap_err();
        assert_eq!(err, MoodError::UnknownEmotion("ecstatic".to_string()));

        let err = assemble_pre_resolved("ecstatic", "nonsense", None).unwrap_err();
        assert_eq!(err, MoodError::UnknownEmotion("ecstatic".to_string()));
    }

    #[test]
    fn empty_band_data_propagates() {
        let err = assemble("happy", &EegBandPowers::default()).unwrap_err();
        assert_eq!(err, MoodError::EmptyBandData);
    }

    #[test]
    fn both_entry_shapes_agree() {
        let cases = [
            (EegBandPowers::new(9.0, 1.0, 1.0, 1.0, 1.0), "Alpha"),
            (EegBandPowers::new(1.0, 9.0, 1.0, 1.0, 1.0), "beta"),
            (EegBandPowers::new(1.0, 1.0, 9.0, 1.0, 1.0), "THETA"),
            (EegBandPowers::new(1.0, 1.0, 1.0, 9.0, 1.0), "delta"),
            (EegBandPowers::new(1.0, 1.0, 1.0, 1.0, 9.0), "Gamma"),
        ];
        for facial in FacialEmotion::ALL {
            for (powers, band_name) in cases.iter() {
                let raw = assemble(facial.as_str(), powers).unwrap();
                let resolved = assemble_pre_resolved(facial.as_str(), band_name, Some(9.0)).unwrap();
                assert_eq!(raw.fusion(), resolved.fusion());
                assert_eq!(
                    raw.report().combined_analysis,
                    resolved.report().combined_analysis
                );
                assert_eq!(raw.report().eeg_analysis, resolved.report().eeg_analysis);
            }
        }
    }

    #[test]
    fn pre_resolved_rejects_unknown_bands() {
        let err = assemble_pre_resolved("happy", "lowbeta", None).unwrap_err();
        assert_eq!(err, MoodError::UnknownBand("lowbeta".to_string()));
    }

    #[test]
    fn pre_resolved_defaults_strength() {
        let session = assemble_pre_resolved("neutral", "delta", None).unwrap();
        assert_eq!(session.band_strength(), DEFAULT_BAND_STRENGTH);
        assert!(session.raw_eeg_powers().is_none());
        assert_eq!(session.fusion().title, "Perfect Balance");
    }

    #[test]
    fn session_ids_have_the_expected_shape() {
        let id = SessionId::generate();
        let parts: Vec<&str> = id.as_str().split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn session_ids_are_unique_across_threads() {
        let ids = Arc::new(Mutex::new(HashSet::new()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        let session =
                            assemble("fear", &EegBandPowers::new(1.0, 2.0, 3.0, 4.0, 5.0)).unwrap();
                        ids.lock().unwrap().insert(session.session_id().clone());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(ids.lock().unwrap().len(), 2000);
    }

    #[test]
    fn report_serializes_with_camel_case_prompts() {
        let session = assemble("sad", &EegBandPowers::new(1.0, 30.0, 1.0, 1.0, 1.0)).unwrap();
        let json = serde_json::to_value(session.report()).unwrap();

        assert_eq!(json["facial_analysis"]["emotion"], "sad");
        assert_eq!(json["facial_analysis"]["title"], "Sad");
        assert_eq!(json["facial_analysis"]["color"], "#2196F3");
        assert_eq!(json["facial_analysis"]["valence"], "negative");
        assert_eq!(json["eeg_analysis"]["dominant_band"], "Beta");
        assert_eq!(json["eeg_analysis"]["mood_indicator"], "Angry");
        assert_eq!(json["combined_analysis"]["title"], "Frustrated Grief");
        assert_eq!(json["combined_analysis"]["combined_mood"], "sad_angry");
        assert_eq!(json["combined_analysis"]["chatAsk"], "What's frustrating you most?");
        assert!(json["combined_analysis"]["chatbotPrompt"].is_string());
        assert_eq!(json["raw_data"]["dominant_frequency"], "beta");
        assert_eq!(json["raw_data"]["frequency_strength"], 30.0);
        assert_eq!(json["raw_data"]["eeg_frequencies"]["beta"], 30.0);
        assert!(json["session_id"].as_str().unwrap().starts_with("session_"));
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
