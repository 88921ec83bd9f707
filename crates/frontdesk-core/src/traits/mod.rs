// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Traits for the external collaborators of the pipeline.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod generator;
pub mod store;
pub mod transport;

pub use adapter::PluginAdapter;
pub use generator::ResponseGenerator;
pub use store::ConversationStore;
pub use transport::TransportSender;
