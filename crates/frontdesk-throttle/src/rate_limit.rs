// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window rate limiting keyed by (endpoint, identifier).
//!
//! Each check-and-increment happens under the map's per-entry lock, so two
//! concurrent triggers for the same caller can never both be admitted past
//! the limit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Over the limit; the current window closes in `retry_after_secs`.
    Rejected { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    length: Duration,
    count: u32,
}

/// Keyed fixed-window counter.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<(String, String), Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and count one event for `identifier` on `endpoint`.
    pub fn check(
        &self,
        identifier: &str,
        endpoint: &str,
        window: Duration,
        max: u32,
    ) -> RateLimitDecision {
        self.check_at(identifier, endpoint, window, max, Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock reading.
    pub fn check_at(
        &self,
        identifier: &str,
        endpoint: &str,
        window: Duration,
        max: u32,
        now: Instant,
    ) -> RateLimitDecision {
        let mut entry = self
            .windows
            .entry((endpoint.to_string(), identifier.to_string()))
            .or_insert(Window {
                start: now,
                length: window,
                count: 0,
            });

        if now.saturating_duration_since(entry.start) >= window {
            entry.start = now;
            entry.count = 0;
        }
        entry.length = window;

        if entry.count >= max {
            let remaining = window.saturating_sub(now.saturating_duration_since(entry.start));
            let mut retry_after_secs = remaining.as_secs();
            if remaining.subsec_nanos() > 0 || retry_after_secs == 0 {
                retry_after_secs += 1;
            }
            return RateLimitDecision::Rejected { retry_after_secs };
        }

        entry.count += 1;
        RateLimitDecision::Allowed
    }

    /// Forget the window for one key.
    pub fn reset(&self, identifier: &str, endpoint: &str) {
        self.windows
            .remove(&(endpoint.to_string(), identifier.to_string()));
    }

    /// Drop windows that ended at least one full window ago. Returns how
    /// many were evicted.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.start) < w.length * 2);
        before.saturating_sub(self.windows.len())
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Run [`sweep_expired`](Self::sweep_expired) every `interval` until
    /// `cancel` fires.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let evicted = limiter.sweep_expired(Instant::now());
                        if evicted > 0 {
                            tracing::debug!(evicted, remaining = limiter.len(), "rate limit sweep");
                        }
                    }
                }
            }
        })
    }
}
