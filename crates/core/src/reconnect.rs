//! Reconnection backoff policy shared by the notification-stream and chat
//! clients.
//!
//! The policy is pure: it computes delays. The async loops that sleep on
//! those delays live next to the connections they manage.

use std::time::Duration;

use rand::Rng;

/// Tunable parameters for capped exponential backoff with jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Fraction of the delay applied as random spread in both directions
    /// (`0.2` means +/-20%). Zero disables jitter.
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

impl ReconnectPolicy {
    /// A policy that always waits exactly `delay`.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }

    /// Calculate the next un-jittered delay from the current one.
    ///
    /// The result is clamped to [`ReconnectPolicy::max_delay`].
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }

    /// Apply jitter to `delay` using `factor` in `-1.0..=1.0`.
    ///
    /// Deterministic so it can be tested; [`Backoff`] supplies the random
    /// factor.
    pub fn jittered_with(&self, delay: Duration, factor: f64) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let spread = self.jitter * factor.clamp(-1.0, 1.0);
        let ms = (delay.as_millis() as f64 * (1.0 + spread)).max(0.0);
        Duration::from_millis(ms.round() as u64)
    }

    /// Start a fresh backoff sequence.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            policy: self.clone(),
            current: self.initial_delay,
            attempt: 0,
        }
    }
}

/// Stateful iterator over the delays of one reconnection sequence.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    current: Duration,
    attempt: u32,
}

impl Backoff {
    /// Delay to wait before the next attempt; advances the sequence.
    pub fn next_wait(&mut self) -> Duration {
        let base = self.current;
        self.current = self.policy.next_delay(self.current);
        self.attempt += 1;

        if self.policy.jitter <= 0.0 {
            return base;
        }
        let factor = rand::rng().random_range(-1.0..=1.0);
        self.policy.jittered_with(base, factor)
    }

    /// Number of waits handed out since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Restart from the initial delay after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.policy.initial_delay;
        self.attempt = 0;
    }
}
