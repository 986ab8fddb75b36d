//! Bounded retry state machine with exponential backoff.
//!
//! ```text
//! Idle -> Attempting -> Success
//!              |     -> TerminalFailure
//!              '-----> BackoffWait -> Attempting
//! ```
//!
//! `Attempting` is entered at most `max_retries + 1` times per call.

use std::time::Duration;

use rand::Rng;

use crate::infrastructure::config::GatewayConfig;

/// Where a logical call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    /// Attempt number `attempt` (zero-based) is in flight.
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed retryably; sleep `delay` before the next one.
    BackoffWait { attempt: u32, delay: Duration },
    Success,
    TerminalFailure,
}

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Retryable,
    Terminal,
}

/// Retry bounds and backoff parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_backoff_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }

    /// Policy that never sleeps; useful for tests and one-shot tools.
    #[must_use]
    pub const fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
        }
    }

    /// Upper bound on attempts for one call.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// `min(base * 2^attempt + jitter, max)`.
    ///
    /// Non-decreasing in `attempt` for a fixed `jitter`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32, jitter: Duration) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let exponential = self.base_delay.saturating_mul(factor);
        exponential.saturating_add(jitter).min(self.max_delay)
    }

    /// Random jitter in `[0, max_jitter]`.
    #[must_use]
    pub fn jitter(&self) -> Duration {
        let max_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Transition after attempt `attempt` ended with `outcome`.
    #[must_use]
    pub fn next_state(&self, attempt: u32, outcome: AttemptOutcome, jitter: Duration) -> CallState {
        match outcome {
            AttemptOutcome::Success => CallState::Success,
            AttemptOutcome::Terminal => CallState::TerminalFailure,
            AttemptOutcome::Retryable if attempt >= self.max_retries => CallState::TerminalFailure,
            AttemptOutcome::Retryable => CallState::BackoffWait {
                attempt,
                delay: self.backoff_delay(attempt, jitter),
            },
        }
    }
}

impl CallState {
    /// Advance the states that need no outside input.
    ///
    /// `Idle` starts the first attempt and a finished backoff starts the next.
    /// Every other state is returned unchanged.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::Idle => Self::Attempting { attempt: 0 },
            Self::BackoffWait { attempt, .. } => Self::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Success | Self::TerminalFailure)
    }
}
