use std::str::FromStr;
use std::time::Duration;

use rand::Rng;

use crate::errors::Error;

/// Strategy for adding randomness to delay calculations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JitterStrategy {
    None,
    /// Scales each delay by a factor in `[1, 1 + (multiplier - 1) / 2)`, which
    /// never overlaps the next step's un-jittered delay.
    Bounded,
}

/// Backoff configuration for transient failures (no response, or 5xx).
#[derive(Clone, Debug)]
pub struct RetryPlan {
    /// Total attempts including the original one.
    pub max_attempts: u8,
    pub initial_delay: Duration,
    pub multiplier: f32,
    pub max_delay: Duration,
    pub jitter: JitterStrategy,
}

impl RetryPlan {
    pub fn new(
        max_attempts: u8,
        initial_delay: Duration,
        multiplier: f32,
        max_delay: Duration,
        jitter: JitterStrategy,
    ) -> Result<Self, Error> {
        if max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".into()));
        }
        if initial_delay.is_zero() {
            return Err(Error::Config("initial retry delay must be > 0".into()));
        }
        if !(multiplier > 1.0) {
            return Err(Error::Config(format!(
                "backoff multiplier must be > 1.0, got {}",
                multiplier
            )));
        }
        if max_delay < initial_delay {
            return Err(Error::Config(
                "max retry delay must not be lower than the initial delay".into(),
            ));
        }
        Ok(Self {
            max_attempts,
            initial_delay,
            multiplier,
            max_delay,
            jitter,
        })
    }

    /// One original attempt plus three retries: 250ms, 500ms, 1s.
    pub fn default_plan() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(250),
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
            jitter: JitterStrategy::None,
        }
    }

    /// A plan that never retries.
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default_plan()
        }
    }

    pub fn max_retries(&self) -> u8 {
        self.max_attempts.saturating_sub(1)
    }

    /// Delay before retry number `retry` (1-based). Never exceeds `max_delay`,
    /// however far the exponent grows.
    pub fn delay_for_attempt(&self, retry: u8, rng: &mut impl Rng) -> Duration {
        let cap = self.max_delay.as_secs_f64();
        let exp = (self.multiplier as f64).powi(retry.max(1) as i32 - 1);
        let mut secs = (self.initial_delay.as_secs_f64() * exp).min(cap);
        if self.jitter == JitterStrategy::Bounded && secs < cap {
            let spread = (self.multiplier as f64 - 1.0) / 2.0;
            secs = (secs * (1.0 + rng.gen_range(0.0..spread))).min(cap);
        }
        Duration::try_from_secs_f64(secs).unwrap_or(self.max_delay)
    }
}

impl Default for RetryPlan {
    fn default() -> Self {
        Self::default_plan()
    }
}

impl FromStr for JitterStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "" => Ok(JitterStrategy::None),
            "bounded" => Ok(JitterStrategy::Bounded),
            other => Err(Error::Config(format!(
                "Unknown jitter strategy '{}'; expected 'none' or 'bounded'",
                other
            ))),
        }
    }
}
