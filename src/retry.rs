use crate::error::{AppError, Result};
use std::time::Duration;

/// Shortest wait after a quota error, and the fixed wait of the legacy policy.
pub const QUOTA_BACKOFF: Duration = Duration::from_millis(2500);

const DEFAULT_MAX_RETRIES: u32 = 5;
const DEFAULT_MULTIPLIER: f64 = 2.0;
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_JITTER: f64 = 0.1;

/// How range writes back off after a quota error.
///
/// The delay before retry `n` (zero-based) is
/// `min(initial_delay * multiplier^n, max_delay)` plus a random extra of up
/// to `jitter` times that value. Jitter only ever lengthens a wait, and
/// `initial_delay` is never below [`QUOTA_BACKOFF`], so no wait is shorter
/// than 2.5 seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: Option<u32>,
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: Some(DEFAULT_MAX_RETRIES),
            initial_delay: QUOTA_BACKOFF,
            multiplier: DEFAULT_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
            jitter: DEFAULT_JITTER,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff with the given schedule.
    ///
    /// `multiplier` must be finite and at least 1.0, `jitter` must lie in
    /// `[0.0, 1.0]` and `initial_delay` must be at least [`QUOTA_BACKOFF`].
    pub fn new(
        max_retries: Option<u32>,
        initial_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
        jitter: f64,
    ) -> Result<Self> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(AppError::Config(format!(
                "retry multiplier must be at least 1.0, got {}",
                multiplier
            )));
        }

        if !jitter.is_finite() || !(0.0..=1.0).contains(&jitter) {
            return Err(AppError::Config(format!(
                "retry jitter must be between 0.0 and 1.0, got {}",
                jitter
            )));
        }

        if initial_delay < QUOTA_BACKOFF {
            return Err(AppError::Config(format!(
                "retry initial delay must be at least {:?}, got {:?}",
                QUOTA_BACKOFF, initial_delay
            )));
        }

        Ok(Self {
            max_retries,
            initial_delay,
            multiplier,
            max_delay,
            jitter,
        })
    }

    /// Fixed 2.5 second wait, unbounded attempts, no jitter.
    pub fn legacy() -> Self {
        Self {
            max_retries: None,
            initial_delay: QUOTA_BACKOFF,
            multiplier: 1.0,
            max_delay: QUOTA_BACKOFF,
            jitter: 0.0,
        }
    }

    /// Never retry.
    pub fn disabled() -> Self {
        Self::default().with_max_retries(Some(0))
    }

    /// Same schedule with a different attempt limit; `None` retries forever.
    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Delay to wait before retry number `retry`, or `None` once the
    /// policy is exhausted.
    pub fn delay_for(&self, retry: u32) -> Option<Duration> {
        if self.max_retries.is_some_and(|max| retry >= max) {
            return None;
        }

        let base = self.base_delay(retry);
        let extra = match self.jitter > 0.0 {
            true => base.as_secs_f64() * self.jitter * rand::random::<f64>(),
            false => 0.0,
        };

        Some(base.saturating_add(Duration::try_from_secs_f64(extra).unwrap_or_default()))
    }

    fn base_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_delay.as_secs_f64());

        // max_delay below initial_delay would otherwise shorten the first wait
        Duration::try_from_secs_f64(capped)
            .unwrap_or(self.max_delay)
            .max(self.initial_delay)
    }
}
