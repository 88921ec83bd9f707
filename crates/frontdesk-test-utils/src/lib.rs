// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for frontdesk integration tests.
//!
//! Provides in-process stand-ins for every external collaborator so the
//! whole pipeline runs deterministically, including under paused tokio time.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory conversation store
//! - [`MockGenerator`] - Response generator with queued replies
//! - [`MockTransport`] - Transport that captures outbound texts
//! - [`PipelineHarness`] - A fully wired pipeline over the mocks

pub mod harness;
pub mod memory_store;
pub mod mock_generator;
pub mod mock_transport;

pub use harness::{PipelineHarness, PipelineHarnessBuilder};
pub use memory_store::MemoryStore;
pub use mock_generator::{MockGenerator, SeenRequest};
pub use mock_transport::{MockTransport, SentText};
