//! Synthetic latency
//!
//! When `max > min`, each call sleeps for a duration drawn uniformly from
//! `[min, max)`. Otherwise no delay is applied. The sleep ignores caller
//! deadlines.

use rand::Rng;
use std::time::Duration;

/// Uniform random delay between two bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayInjector {
    min: Duration,
    max: Duration,
}

impl DelayInjector {
    /// Create an injector; `max <= min` disables it
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Injector that never delays
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Lower bound
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound (exclusive)
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Whether calls are delayed at all
    pub fn is_enabled(&self) -> bool {
        self.max > self.min
    }

    /// Draw a delay, or `None` when disabled
    pub fn sample(&self) -> Option<Duration> {
        if !self.is_enabled() {
            return None;
        }
        Some(rand::thread_rng().gen_range(self.min..self.max))
    }

    /// Sleep for a sampled delay and return how long was slept
    pub async fn wait(&self) -> Duration {
        match self.sample() {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                delay
            }
            None => Duration::ZERO,
        }
    }
}
