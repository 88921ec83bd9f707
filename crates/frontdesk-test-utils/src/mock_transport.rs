// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport that captures every outbound text.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use frontdesk_core::{
    AdapterType, DeliveryReceipt, FrontdeskError, HealthStatus, PluginAdapter, TransportSender,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentText {
    pub channel: String,
    pub to: String,
    pub text: String,
}

/// Records sends; recipients marked failing get an unsent receipt.
pub struct MockTransport {
    sent: Arc<Mutex<Vec<SentText>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Every send to `to` (canonical form) will be refused.
    pub async fn fail_for(&self, to: &str) {
        self.failing.lock().await.insert(to.to_string());
    }

    pub async fn recover(&self, to: &str) {
        self.failing.lock().await.remove(to);
    }

    /// Texts accepted so far.
    pub async fn sent(&self) -> Vec<SentText> {
        self.sent.lock().await.clone()
    }

    /// Texts accepted for one recipient.
    pub async fn sent_to(&self, to: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|s| s.to == to)
            .map(|s| s.text.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, FrontdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FrontdeskError> {
        Ok(())
    }
}

#[async_trait]
impl TransportSender for MockTransport {
    async fn send(
        &self,
        channel: &str,
        to: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, FrontdeskError> {
        if self.failing.lock().await.contains(to) {
            return Ok(DeliveryReceipt {
                sent: false,
                provider: "mock".to_string(),
                error: Some(format!("recipient {to} unreachable")),
            });
        }
        self.sent.lock().await.push(SentText {
            channel: channel.to_string(),
            to: to.to_string(),
            text: text.to_string(),
        });
        Ok(DeliveryReceipt {
            sent: true,
            provider: "mock".to_string(),
            error: None,
        })
    }
}
