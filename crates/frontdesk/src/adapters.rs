// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in collaborators for `frontdesk serve`.
//!
//! The serve loop speaks JSON lines: outbound texts are written to stdout as
//! `{"type":"sent",...}` records for a downstream SMS gateway to pick up, and
//! replies come from a template generator until a real model is wired in.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

use frontdesk_config::model::BusinessConfig;
use frontdesk_core::{
    AdapterType, DeliveryReceipt, FrontdeskError, GeneratedResponse, GenerationRequest,
    HealthStatus, PluginAdapter, QueryCategory, ResponseGenerator, ResponseScope,
    TransportSender,
};

/// Confidence reported for template replies.
const TEMPLATE_CONFIDENCE: u8 = 80;

/// Serialized, line-at-a-time writer shared by every task of the serve loop.
pub struct JsonLines<W> {
    out: Arc<Mutex<W>>,
}

impl<W> Clone for JsonLines<W> {
    fn clone(&self) -> Self {
        Self {
            out: Arc::clone(&self.out),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    /// Write one record followed by a newline.
    pub async fn emit<T: Serialize>(&self, record: &T) -> Result<(), FrontdeskError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| FrontdeskError::Internal(format!("failed to encode record: {e}")))?;
        line.push('\n');
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| FrontdeskError::Internal(format!("failed to write record: {e}")))?;
        out.flush()
            .await
            .map_err(|e| FrontdeskError::Internal(format!("failed to flush output: {e}")))
    }

    #[cfg(test)]
    pub(crate) async fn contents(&self) -> W
    where
        W: Clone,
    {
        self.out.lock().await.clone()
    }
}

impl JsonLines<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[derive(Serialize)]
struct SentRecord<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    channel: &'a str,
    to: &'a str,
    text: &'a str,
}

/// Transport that hands every outbound text to the JSON-lines output.
pub struct JsonLinesTransport<W> {
    out: JsonLines<W>,
}

impl<W> JsonLinesTransport<W> {
    pub fn new(out: JsonLines<W>) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> PluginAdapter for JsonLinesTransport<W> {
    fn name(&self) -> &str {
        "json-lines"
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
impl<W: AsyncWrite + Unpin + Send + 'static> TransportSender for JsonLinesTransport<W> {
    async fn send(
        &self,
        channel: &str,
        to: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, FrontdeskError> {
        let record = SentRecord {
            kind: "sent",
            channel,
            to,
            text,
        };
        match self.out.emit(&record).await {
            Ok(()) => Ok(DeliveryReceipt {
                sent: true,
                provider: "json-lines".to_string(),
                error: None,
            }),
            Err(e) => {
                warn!(to = %to, error = %e, "outbound text not written");
                Ok(DeliveryReceipt {
                    sent: false,
                    provider: "json-lines".to_string(),
                    error: Some(e.to_string()),
                })
            }
        }
    }
}

/// Generator that answers from fixed wording signed by the persona.
pub struct TemplateGenerator {
    business_name: String,
    signature: String,
}

impl TemplateGenerator {
    pub fn new(business: &BusinessConfig) -> Self {
        Self {
            business_name: business.name.clone(),
            signature: business.persona_signature.clone(),
        }
    }

    fn body(&self, scope: ResponseScope) -> String {
        match scope {
            ResponseScope::Full => format!(
                "Thanks for getting in touch with {}. We'll get back to you as soon as we can.",
                self.business_name
            ),
            ResponseScope::SimpleQueryOnly(category) => match category {
                QueryCategory::Hours => {
                    "Our opening hours are on our website, and we're happy to confirm by text."
                        .to_string()
                }
                QueryCategory::Location | QueryCategory::Directions => {
                    "You'll find our address and directions on our website.".to_string()
                }
                QueryCategory::Contact => {
                    "You can reach us on this number any time.".to_string()
                }
            },
        }
    }
}

#[async_trait]
impl PluginAdapter for TemplateGenerator {
    fn name(&self) -> &str {
        "template"
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
impl ResponseGenerator for TemplateGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedResponse, FrontdeskError> {
        let mut responses = Vec::with_capacity(2);
        if let Some(closure) = &request.closure
            && !closure.message.is_empty()
        {
            responses.push(closure.message.clone());
        }
        responses.push(format!("{} {}", self.body(request.scope), self.signature));
        Ok(GeneratedResponse {
            responses,
            provider: "template".to_string(),
            model: "static".to_string(),
            confidence: TEMPLATE_CONFIDENCE,
            context: None,
        })
    }
}
