//! Client-side countdown for throttled email endpoints.
//!
//! The backend answers rate-limited calls with `retryAfterSeconds`; this
//! turns that hint into a deadline the UI can poll once per tick.

use std::time::{Duration, Instant};

use crate::client::ApiError;
use crate::models::CooldownHint;

/// Used when a send succeeded and the backend did not say how long to wait.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, Default)]
pub struct Cooldown {
    ends_at: Option<Instant>,
}

impl Cooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the countdown. Zero means the default length.
    pub fn start(&mut self, seconds: u64) {
        self.start_at(Instant::now(), seconds);
    }

    pub fn start_at(&mut self, now: Instant, seconds: u64) {
        let length = if seconds == 0 {
            DEFAULT_COOLDOWN
        } else {
            Duration::from_secs(seconds)
        };
        self.ends_at = Some(now + length);
    }

    /// Seeds from a cooldown endpoint; a zero hint leaves the cooldown idle.
    pub fn start_from_hint(&mut self, hint: CooldownHint) -> bool {
        if hint.retry_after_seconds == 0 {
            return false;
        }
        self.start(hint.retry_after_seconds);
        true
    }

    /// Seeds from a throttling error; returns whether the error carried a hint.
    pub fn start_from_error(&mut self, err: &ApiError) -> bool {
        match err.retry_after() {
            Some(left) if !left.is_zero() => {
                self.start(left.as_secs());
                true
            }
            _ => false,
        }
    }

    pub fn remaining_secs(&mut self) -> u64 {
        self.remaining_secs_at(Instant::now())
    }

    /// Whole seconds left, rounded up. Clears itself once the deadline passes.
    pub fn remaining_secs_at(&mut self, now: Instant) -> u64 {
        let Some(ends_at) = self.ends_at else {
            return 0;
        };
        let left = ends_at.saturating_duration_since(now);
        if left.is_zero() {
            self.ends_at = None;
            return 0;
        }
        left.as_secs() + u64::from(left.subsec_nanos() > 0)
    }

    pub fn is_active(&mut self) -> bool {
        self.remaining_secs() > 0
    }
}
