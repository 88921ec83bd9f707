// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frontdesk agent: the inbound message pipeline and everything that
//! decides whether a human or the automated persona answers.
//!
//! - [`pipeline`]: classify, persist, batch, decide, reply
//! - [`mode`]: the auto/manual/paused/archived state machine
//! - [`escalation`]: staff alerts with per-conversation cooldown
//! - [`sweep`]: periodic stale-manual reset and rate-limit eviction
//! - [`shutdown`]: signal-driven cancellation

pub mod escalation;
pub mod mode;
pub mod pipeline;
pub mod recording;
pub mod shutdown;
pub mod sweep;

pub use escalation::{EscalationDispatcher, EscalationPolicy, EscalationRequest, NotifyOutcome};
pub use mode::{
    ConversationView, HoldReason, ModeController, ModeDecision, Transition, TransitionCause,
};
pub use pipeline::{
    EchoOutcome, InboundOutcome, InboundPipeline, MissedCallOutcome, PipelineSettings, StaffReply,
};
pub use shutdown::install_signal_handler;
