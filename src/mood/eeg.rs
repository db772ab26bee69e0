use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FacialEmotion, MoodError, MoodIndicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EegBand {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}

impl EegBand {
    /// Order of the dominant band scan. On exact ties the earliest band wins.
    pub const SCAN_ORDER: [EegBand; 5] = [
        EegBand::Alpha,
        EegBand::Beta,
        EegBand::Theta,
        EegBand::Delta,
        EegBand::Gamma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EegBand::Delta => "Delta",
            EegBand::Theta => "Theta",
            EegBand::Alpha => "Alpha",
            EegBand::Beta => "Beta",
            EegBand::Gamma => "Gamma",
        }
    }

    /// Lowercase key used in band power payloads.
    pub fn key(self) -> &'static str {
        match self {
            EegBand::Delta => "delta",
            EegBand::Theta => "theta",
            EegBand::Alpha => "alpha",
            EegBand::Beta => "beta",
            EegBand::Gamma => "gamma",
        }
    }

    /// Short label shown next to live band power readings.
    pub fn feed_label(self) -> &'static str {
        match self {
            EegBand::Delta => "Deep sleep, recovery",
            EegBand::Theta => "Drowsiness, meditation",
            EegBand::Alpha => "Relaxation, creativity",
            EegBand::Beta => "Focus, alertness",
            EegBand::Gamma => "Information processing",
        }
    }
}

impl fmt::Display for EegBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EegBand {
    type Err = MoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_band(s)
    }
}

/// Case-insensitive band name lookup, accepts both "alpha" and "Alpha".
pub fn parse_band(name: &str) -> Result<EegBand, MoodError> {
    let normalized = name.trim().to_lowercase();
    EegBand::SCAN_ORDER
        .into_iter()
        .find(|band| band.key() == normalized)
        .ok_or_else(|| MoodError::UnknownBand(name.to_string()))
}

/// Static emotional reading of a dominant band.
#[derive(Debug, PartialEq, Eq)]
pub struct BandStateDescriptor {
    pub emotional_state: &'static str,
    pub mood_indicator: MoodIndicator,
    pub color: &'static str,
    pub description: &'static str,
}

static DELTA_STATE: BandStateDescriptor = BandStateDescriptor {
    emotional_state: "Subconscious Processing",
    mood_indicator: FacialEmotion::Neutral,
    color: "#2D1B69",
    description: "Deep processing/recovery state",
};

static THETA_STATE: BandStateDescriptor = BandStateDescriptor {
    emotional_state: "Emotional Vulnerability",
    mood_indicator: FacialEmotion::Sad,
    color: "#8E44AD",
    description: "Emotional processing and vulnerability",
};

static ALPHA_STATE: BandStateDescriptor = BandStateDescriptor {
    emotional_state: "Peaceful Contentment",
    mood_indicator: FacialEmotion::Happy,
    color: "#27AE60",
    description: "Relaxed awareness and contentment",
};

static BETA_STATE: BandStateDescriptor = BandStateDescriptor {
    emotional_state: "Mental Agitation",
    mood_indicator: FacialEmotion::Angry,
    color: "#F39C12",
    description: "Stress and mental tension",
};

static GAMMA_STATE: BandStateDescriptor = BandStateDescriptor {
    emotional_state: "Intense Processing",
    mood_indicator: FacialEmotion::Fear,
    color: "#E74C3C",
    description: "High-intensity emotional processing",
};

pub fn resolve_band_state(band: EegBand) -> &'static BandStateDescriptor {
    match band {
        EegBand::Delta => &DELTA_STATE,
        EegBand::Theta => &THETA_STATE,
        EegBand::Alpha => &ALPHA_STATE,
        EegBand::Beta => &BETA_STATE,
        EegBand::Gamma => &GAMMA_STATE,
    }
}

/// Band power magnitudes of one sample window. Absent bands are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EegBandPowers {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub theta: Option<f64>,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
}

impl EegBandPowers {
    pub fn new(alpha: f64, beta: f64, theta: f64, delta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            theta: Some(theta),
            delta: Some(delta),
            gamma: Some(gamma),
        }
    }

    pub fn get(&self, band: EegBand) -> Option<f64> {
        match band {
            EegBand::Delta => self.delta,
            EegBand::Theta => self.theta,
            EegBand::Alpha => self.alpha,
            EegBand::Beta => self.beta,
            EegBand::Gamma => self.gamma,
        }
    }

    /// Present, comparable magnitudes in scan order.
    pub fn readings(&self) -> impl Iterator<Item = (EegBand, f64)> + '_ {
        EegBand::SCAN_ORDER
            .into_iter()
            .filter_map(move |band| self.get(band).filter(|v| !v.is_nan()).map(|v| (band, v)))
    }

    /// Magnitude of the dominant band, if any band is present.
    pub fn strongest(&self) -> Option<(EegBand, f64)> {
        let mut best: Option<(EegBand, f64)> = None;
        for (band, value) in self.readings() {
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((band, value)),
            }
        }
        best
    }
}

/// Picks the band with the strictly largest magnitude; first-max in scan order.
pub fn dominant_band(powers: &EegBandPowers) -> Result<EegBand, MoodError> {
    powers
        .strongest()
        .map(|(band, _)| band)
        .ok_or(MoodError::EmptyBandData)
}

/// Relative share of one band in a sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandPowerShare {
    pub band: &'static str,
    pub percentage: f64,
    pub description: &'static str,
}

pub fn band_power_shares(powers: &EegBandPowers) -> Vec<BandPowerShare> {
    let total: f64 = powers.readings().map(|(_, v)| v).sum();
    powers
        .readings()
        .map(|(band, value)| BandPowerShare {
            band: band.key(),
            percentage: if total > 0.0 {
                (value / total * 10_000.0).round() / 100.0
            } else {
                0.0
            },
            description: band.feed_label(),
        })
        .collect()
}
