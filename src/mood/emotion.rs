use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MoodError;

/// One of the seven labels produced by the facial-expression classifier.
///
/// The same closed set is used as the EEG side of the fusion table, where a
/// band's mood indicator is always one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacialEmotion {
    Happy,
    Sad,
    Angry,
    Neutral,
    Fear,
    Disgust,
    Surprise,
}

/// The coarse emotional category an EEG band maps to.
pub type MoodIndicator = FacialEmotion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Valence {
    Positive,
    Negative,
    Neutral,
}

impl FacialEmotion {
    pub const ALL: [FacialEmotion; 7] = [
        FacialEmotion::Happy,
        FacialEmotion::Sad,
        FacialEmotion::Angry,
        FacialEmotion::Neutral,
        FacialEmotion::Fear,
        FacialEmotion::Disgust,
        FacialEmotion::Surprise,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FacialEmotion::Happy => "happy",
            FacialEmotion::Sad => "sad",
            FacialEmotion::Angry => "angry",
            FacialEmotion::Neutral => "neutral",
            FacialEmotion::Fear => "fear",
            FacialEmotion::Disgust => "disgust",
            FacialEmotion::Surprise => "surprise",
        }
    }

    /// Display form, e.g. "Happy".
    pub fn title(self) -> &'static str {
        match self {
            FacialEmotion::Happy => "Happy",
            FacialEmotion::Sad => "Sad",
            FacialEmotion::Angry => "Angry",
            FacialEmotion::Neutral => "Neutral",
            FacialEmotion::Fear => "Fear",
            FacialEmotion::Disgust => "Disgust",
            FacialEmotion::Surprise => "Surprise",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            FacialEmotion::Happy => "#4CAF50",
            FacialEmotion::Sad => "#2196F3",
            FacialEmotion::Angry => "#F44336",
            FacialEmotion::Neutral => "#9E9E9E",
            FacialEmotion::Fear => "#FF9800",
            FacialEmotion::Disgust => "#795548",
            FacialEmotion::Surprise => "#9C27B0",
        }
    }

    pub fn valence(self) -> Valence {
        match self {
            FacialEmotion::Happy | FacialEmotion::Surprise => Valence::Positive,
            FacialEmotion::Sad
            | FacialEmotion::Angry
            | FacialEmotion::Fear
            | FacialEmotion::Disgust => Valence::Negative,
            FacialEmotion::Neutral => Valence::Neutral,
        }
    }
}

impl fmt::Display for FacialEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacialEmotion {
    type Err = MoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_facial(s)
    }
}

/// Trims and lowercases a classifier label and maps it onto the closed set.
pub fn normalize_facial(label: &str) -> Result<FacialEmotion, MoodError> {
    let normalized = label.trim().to_lowercase();
    FacialEmotion::ALL
        .into_iter()
        .find(|emotion| emotion.as_str() == normalized)
        .ok_or_else(|| MoodError::UnknownEmotion(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_facial("happy"), Ok(FacialEmotion::Happy));
        assert_eq!(normalize_facial("  SAD "), Ok(FacialEmotion::Sad));
        assert_eq!(normalize_facial("Surprise"), Ok(FacialEmotion::Surprise));
    }

    #[test]
    fn rejects_unknown_labels() {
        assert_eq!(
            normalize_facial("ecstatic"),
            Err(MoodError::UnknownEmotion("ecstatic".to_string()))
        );
        assert!(normalize_facial("").is_err());
        assert!(normalize_facial("error").is_err());
    }

    #[test]
    fn every_label_round_trips_through_as_str() {
        for emotion in FacialEmotion::ALL {
            assert_eq!(emotion.as_str().parse::<FacialEmotion>(), Ok(emotion));
            assert_eq!(emotion.title().to_lowercase(), emotion.as_str());
        }
    }

    #[test]
    fn valence_groups() {
        assert_eq!(FacialEmotion::Happy.valence(), Valence::Positive);
        assert_eq!(FacialEmotion::Surprise.valence(), Valence::Positive);
        assert_eq!(FacialEmotion::Neutral.valence(), Valence::Neutral);
        for emotion in [
            FacialEmotion::Sad,
            FacialEmotion::Angry,
            FacialEmotion::Fear,
            FacialEmotion::Disgust,
        ] {
            assert_eq!(emotion.valence(), Valence::Negative);
        }
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FacialEmotion::Disgust).unwrap(),
            "\"disgust\""
        );
    }
}
