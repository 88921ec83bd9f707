// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound throttling: a keyed fixed-window rate limiter and a debouncing
//! message batcher.

pub mod batcher;
pub mod rate_limit;

pub use batcher::{Batch, BatchKey, BatchOutcome, MessageBatcher};
pub use rate_limit::{RateLimitDecision, RateLimiter};
