//! EEG acquisition seam. The headset driver lives outside this crate; the
//! server only needs the most recent band power sample.

mod simulated;

pub use simulated::{SimulatedEegFeed, SIMULATED_POWER_RANGE};

use crate::mood::EegBandPowers;
use std::sync::Mutex;

pub trait EegFeed: Send + Sync {
    /// Latest band power sample, `None` until the first one arrives.
    fn latest(&self) -> Option<EegBandPowers>;

    /// Accepts a sample pushed by an acquisition client. Feeds that produce
    /// their own samples refuse it and return `false`.
    fn push(&self, _sample: EegBandPowers) -> bool {
        false
    }
}

/// A feed that reports the sample it was last given, either pushed over
/// `POST /v1/eeg/bandpower` or set directly.
#[derive(Default)]
pub struct FixedEegFeed {
    sample: Mutex<Option<EegBandPowers>>,
}

impl FixedEegFeed {
    pub fn new(sample: Option<EegBandPowers>) -> Self {
        Self {
            sample: Mutex::new(sample),
        }
    }

    pub fn set(&self, sample: EegBandPowers) {
        *self.sample.lock().unwrap() = Some(sample);
    }
}

impl EegFeed for FixedEegFeed {
    fn latest(&self) -> Option<EegBandPowers> {
        *self.sample.lock().unwrap()
    }

    fn push(&self, sample: EegBandPowers) -> bool {
        self.set(sample);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_feed_reports_last_sample() {
        let feed = FixedEegFeed::default();
        assert!(feed.latest().is_none());

        let sample = EegBandPowers::new(1.0, 2.0, 3.0, 4.0, 5.0);
        feed.set(sample);
        assert_eq!(feed.latest(), Some(sample));

        let pushed = EegBandPowers::new(9.0, 1.0, 1.0, 1.0, 1.0);
        assert!(feed.push(pushed));
        assert_eq!(feed.latest(), Some(pushed));
    }
}
