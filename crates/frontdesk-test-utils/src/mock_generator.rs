// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock response generator for deterministic testing.
//!
//! Replies are popped from a FIFO queue. When the queue is empty a default
//! single-segment reply with confidence 90 is returned.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use frontdesk_core::{
    AdapterType, FrontdeskError, GeneratedResponse, GenerationRequest, HealthStatus,
    PluginAdapter, ResponseGenerator, ResponseScope,
};

/// Confidence of the default reply.
pub const DEFAULT_CONFIDENCE: u8 = 90;

enum Scripted {
    Reply(GeneratedResponse),
    Fail(String),
}

/// Captured generation request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub customer_message: String,
    pub scope: ResponseScope,
    pub history_len: usize,
    pub closure_message: Option<String>,
}

pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a reply made of `segments` with the given confidence.
    pub async fn push_reply(&self, segments: &[&str], confidence: u8) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Reply(response(segments, confidence)));
    }

    /// Make the next call fail with a generator error.
    pub async fn push_failure(&self, message: &str) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.to_string()));
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.seen.lock().await.len()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn response(segments: &[&str], confidence: u8) -> GeneratedResponse {
    GeneratedResponse {
        responses: segments.iter().map(|s| s.to_string()).collect(),
        provider: "mock".to_string(),
        model: "mock-model".to_string(),
        confidence,
        context: None,
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, FrontdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FrontdeskError> {
        Ok(())
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedResponse, FrontdeskError> {
        self.seen.lock().await.push(SeenRequest {
            customer_message: request.customer_message.clone(),
            scope: request.scope,
            history_len: request.history.len(),
            closure_message: request.closure.as_ref().map(|c| c.message.clone()),
        });
        match self.script.lock().await.pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Fail(message)) => Err(FrontdeskError::Generator {
                message,
                source: None,
            }),
            None => Ok(response(
                &["Thanks for your message, we'll be right with you. AI Steve"],
                DEFAULT_CONFIDENCE,
            )),
        }
    }
}
