// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `PipelineHarness` assembles an [`InboundPipeline`] over the in-memory
//! store, mock generator and mock transport, and offers shortcuts for
//! driving it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use frontdesk_agent::{InboundOutcome, InboundPipeline};
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{
    Conversation, ConversationStore, Customer, FrontdeskError, InboundMessage, PhoneNumber,
    ResponseGenerator, TransportSender,
};

use crate::memory_store::MemoryStore;
use crate::mock_generator::MockGenerator;
use crate::mock_transport::MockTransport;

/// Builder for creating test pipelines with configurable options.
pub struct PipelineHarnessBuilder {
    config: FrontdeskConfig,
}

impl PipelineHarnessBuilder {
    fn new() -> Self {
        let mut config = FrontdeskConfig::default();
        config.batching.enabled = false;
        config.escalation.notify_to = vec!["07700 900999".to_string()];
        Self { config }
    }

    /// Enable batching with the given window.
    pub fn with_batching(mut self, window_ms: u64) -> Self {
        self.config.batching.enabled = true;
        self.config.batching.window_ms = window_ms;
        self
    }

    /// Adjust any other setting.
    pub fn configure(mut self, edit: impl FnOnce(&mut FrontdeskConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    pub fn build(self) -> PipelineHarness {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(MockGenerator::new());
        let transport = Arc::new(MockTransport::new());
        let pipeline = Arc::new(InboundPipeline::new(
            &self.config,
            Arc::clone(&store) as Arc<dyn ConversationStore>,
            Arc::clone(&generator) as Arc<dyn ResponseGenerator>,
            Arc::clone(&transport) as Arc<dyn TransportSender>,
        ));
        PipelineHarness {
            pipeline,
            store,
            generator,
            transport,
            config: self.config,
        }
    }
}

/// A fully wired pipeline over mock collaborators.
pub struct PipelineHarness {
    pub pipeline: Arc<InboundPipeline>,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<MockGenerator>,
    pub transport: Arc<MockTransport>,
    pub config: FrontdeskConfig,
}

impl PipelineHarness {
    pub fn builder() -> PipelineHarnessBuilder {
        PipelineHarnessBuilder::new()
    }

    /// Default harness: batching off, one escalation recipient.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// The escalation recipient in canonical form.
    pub fn staff_phone(&self) -> String {
        self.config
            .escalation
            .notify_to
            .first()
            .and_then(|raw| PhoneNumber::parse(raw))
            .map(|p| p.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn inbound(from: &str, text: &str, at: DateTime<Utc>) -> InboundMessage {
        InboundMessage {
            channel: "sms".to_string(),
            from: from.to_string(),
            text: text.to_string(),
            received_at: at,
        }
    }

    /// Push one SMS through the pipeline.
    pub async fn send(
        &self,
        from: &str,
        text: &str,
        at: DateTime<Utc>,
    ) -> Result<InboundOutcome, FrontdeskError> {
        self.pipeline
            .handle_inbound(Self::inbound(from, text, at))
            .await
    }

    /// The customer and open SMS conversation for `from`, creating them if
    /// needed.
    pub async fn conversation_for(
        &self,
        from: &str,
        at: DateTime<Utc>,
    ) -> (Customer, Conversation) {
        let phone = PhoneNumber::parse(from).unwrap_or_else(|| panic!("bad test phone {from}"));
        let customer = self
            .store
            .find_or_create_customer(&phone, at)
            .await
            .unwrap_or_else(|e| panic!("store failed: {e}"));
        let conversation = self
            .store
            .find_or_create_conversation(&customer.id, "sms", at)
            .await
            .unwrap_or_else(|e| panic!("store failed: {e}"));
        (customer, conversation)
    }
}

impl Default for PipelineHarness {
    fn default() -> Self {
        Self::new()
    }
}
