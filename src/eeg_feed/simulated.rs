use super::EegFeed;
use crate::mood::EegBandPowers;
use rand::Rng;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const SIMULATED_POWER_RANGE: Range<f64> = 5.0..40.0;

/// Stands in for a headset: produces a fresh random sample on every tick.
#[derive(Default)]
pub struct SimulatedEegFeed {
    latest: Mutex<Option<EegBandPowers>>,
}

fn random_power(rng: &mut impl Rng) -> f64 {
    let value = rng.random_range(SIMULATED_POWER_RANGE);
    (value * 100.0).round() / 100.0
}

impl SimulatedEegFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws and stores a new sample.
    pub fn sample(&self) -> EegBandPowers {
        let mut rng = rand::rng();
        let powers = EegBandPowers::new(
            random_power(&mut rng),
            random_power(&mut rng),
            random_power(&mut rng),
            random_power(&mut rng),
            random_power(&mut rng),
        );
        *self.latest.lock().unwrap() = Some(powers);
        powers
    }

    /// Keeps sampling every `interval` until the returned task is aborted.
    pub fn spawn(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        info!("Simulated EEG feed sampling every {:?}", interval);
        let feed = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let powers = feed.sample();
                debug!("Simulated EEG sample: {:?}", powers);
            }
        })
    }
}

impl EegFeed for SimulatedEegFeed {
    fn latest(&self) -> Option<EegBandPowers> {
        *self.latest.lock().unwrap()
    }
}
