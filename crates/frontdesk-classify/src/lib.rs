// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic classification of inbound messages.
//!
//! This crate provides:
//! - [`autoresponder`]: automated/spam sender detection with audit reasons
//! - [`sender`]: staff vs automated persona detection for shared numbers
//! - [`simple_query`]: factual questions answerable without context
//! - [`mode_hint`]: acknowledgments and the auto-handle heuristic
//! - [`holiday`]: closure notices and return dates
//! - [`chain`]: the ordered [`ClassifierChain`] the pipeline runs
//!
//! Every classifier is a pure, total function over its input: no I/O, no
//! panics on malformed text, zero latency.

pub mod autoresponder;
pub mod chain;
pub mod holiday;
pub mod mode_hint;
pub mod sender;
pub mod simple_query;

pub use autoresponder::AutomatedCategory;
pub use chain::{ChainOutcome, Classifier, ClassifierChain, ClassifierInput, Confidence, Label, Verdict};
pub use holiday::{ClosureWindow, HolidayStatus};
pub use sender::{SenderDetection, SenderDetector};
pub use simple_query::SimpleQuery;
