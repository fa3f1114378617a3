//! Per-provider sliding-window rate limiting
//!
//! A provider is limited once it has `max_calls` recorded selections inside
//! the trailing `window`. With the defaults (one call per hour) a single
//! selection puts the provider into cooldown for an hour.
//!
//! Timestamps come from `tokio::time::Instant` so tests can drive the window
//! with a paused clock.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tokio::time::Instant;

use crate::ai::providers::ProviderId;
use crate::config::RateLimitSettings;

/// Sliding-window call tracker.
///
/// Not internally synchronized; the provider manager holds it behind a mutex
/// so that checking and recording happen in one critical section.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_calls: usize,
    calls: HashMap<ProviderId, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_calls: usize) -> Self {
        Self {
            window,
            // Zero would limit everything forever
            max_calls: max_calls.max(1),
            calls: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.window(), settings.max_calls)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether `provider` has used up its calls for the current window
    pub fn is_limited(&self, provider: ProviderId) -> bool {
        let now = Instant::now();
        self.calls
            .get(&provider)
            .map(|calls| calls.iter().filter(|t| self.in_window(**t, now)).count())
            .unwrap_or(0)
            >= self.max_calls
    }

    /// Record a call against `provider` at the current instant
    pub fn record(&mut self, provider: ProviderId) {
        let now = Instant::now();
        let window = self.window;
        let calls = self.calls.entry(provider).or_default();
        calls.retain(|t| now.saturating_duration_since(*t) < window);
        calls.push_back(now);
    }

    /// Record a call only if `provider` is not limited. Returns whether it was recorded.
    pub fn try_acquire(&mut self, provider: ProviderId) -> bool {
        if self.is_limited(provider) {
            return false;
        }
        self.record(provider);
        true
    }

    /// Time until `provider` leaves the limited state, if it is limited
    pub fn retry_after(&self, provider: ProviderId) -> Option<Duration> {
        if !self.is_limited(provider) {
            return None;
        }
        let now = Instant::now();
        let calls = self.calls.get(&provider)?;
        let live: Vec<&Instant> = calls.iter().filter(|t| self.in_window(**t, now)).collect();
        // The window frees up when the oldest call that keeps us at the cap expires
        let pivot = live.get(live.len().saturating_sub(self.max_calls))?;
        Some(self.window.saturating_sub(now.saturating_duration_since(**pivot)))
    }

    /// Most recent recorded call for `provider`
    pub fn last_call(&self, provider: ProviderId) -> Option<Instant> {
        self.calls.get(&provider).and_then(|c| c.back().copied())
    }

    fn in_window(&self, at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(at) < self.window
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_settings(&RateLimitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_single_call_window() {
        let mut limiter = RateLimiter::new(Duration::from_secs(3600), 1);
        assert!(!limiter.is_limited(ProviderId::OpenAI));

        limiter.record(ProviderId::OpenAI);
        assert!(limiter.is_limited(ProviderId::OpenAI));
        assert!(!limiter.is_limited(ProviderId::Google));

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert!(limiter.is_limited(ProviderId::OpenAI));
        assert_eq!(
            limiter.retry_after(ProviderId::OpenAI),
            Some(Duration::from_secs(1))
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!limiter.is_limited(ProviderId::OpenAI));
        assert_eq!(limiter.retry_after(ProviderId::OpenAI), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_multiple_calls_per_window() {
        let mut limiter = RateLimiter::new(Duration::from_secs(60), 3);

        assert!(limiter.try_acquire(ProviderId::Anthropic));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.try_acquire(ProviderId::Anthropic));
        assert!(limiter.try_acquire(ProviderId::Anthropic));
        assert!(!limiter.try_acquire(ProviderId::Anthropic));

        // First call ages out after 60s from its timestamp
        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(!limiter.is_limited(ProviderId::Anthropic));
        assert!(limiter.try_acquire(ProviderId::Anthropic));
        assert!(limiter.is_limited(ProviderId::Anthropic));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_call_tracks_most_recent() {
        let mut limiter = RateLimiter::default();
        assert!(limiter.last_call(ProviderId::Google).is_none());

        limiter.record(ProviderId::Google);
        let first = limiter.last_call(ProviderId::Google).unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        limiter.record(ProviderId::Google);
        assert_eq!(
            limiter.last_call(ProviderId::Google).unwrap() - first,
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_zero_max_calls_is_clamped() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1), 0);
        assert!(limiter.try_acquire(ProviderId::OpenAI));
    }
}
