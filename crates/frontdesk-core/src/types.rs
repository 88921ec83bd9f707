// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the pipeline, the store and the operator surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::phone::PhoneNumber;

/// Unique identifier for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

macro_rules! impl_id {
    ($($name:ident),*) => {
        $(
            impl $name {
                /// Generate a fresh random identifier.
                pub fn generate() -> Self {
                    Self(uuid::Uuid::new_v4().to_string())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

impl_id!(CustomerId, ConversationId, MessageId);

/// Automation state of a conversation.
///
/// Only the conversation-mode state machine changes this value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Automation fully responds.
    Auto,
    /// A human is actively handling the conversation.
    Manual,
    /// Automation disabled by the operator kill switch.
    Paused,
    /// Terminal. No further processing.
    Archived,
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Customer,
    Staff,
    Ai,
    System,
}

/// Kind of staff notification raised by the escalation dispatcher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// A customer is waiting on a conversation a human is handling.
    ManualRequired,
    /// The generator replied but was not confident in its answer.
    LowConfidence,
    /// Urgent; allowed to repeat on a shorter cooldown.
    HighPriority,
    /// A customer called and nobody picked up.
    MissedCall,
}

/// Categories of factual questions that can be answered without context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Hours,
    Location,
    Directions,
    Contact,
}

/// A customer, identified solely by canonical phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub phone: PhoneNumber,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A conversation between one customer and the business on one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub customer_id: CustomerId,
    pub channel: String,
    pub status: ConversationStatus,
    /// Status held before the kill switch paused this conversation.
    pub paused_from: Option<ConversationStatus>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// A fresh conversation in automatic mode.
    pub fn new(customer_id: CustomerId, channel: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ConversationId::generate(),
            customer_id,
            channel: channel.into(),
            status: ConversationStatus::Auto,
            paused_from: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single message in a conversation. Append-only apart from `sender`
/// corrections and delivery fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Generator confidence (0-100) for AI-authored messages.
    pub ai_confidence: Option<u8>,
    pub delivery_status: Option<String>,
    pub delivery_provider: Option<String>,
}

impl Message {
    pub fn new(
        conversation_id: ConversationId,
        sender: Sender,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            sender,
            text: text.into(),
            created_at,
            ai_confidence: None,
            delivery_status: None,
            delivery_provider: None,
        }
    }
}

/// A staff notification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub conversation_id: ConversationId,
    pub alert_type: AlertType,
    pub notified_to: String,
    pub created_at: DateTime<Utc>,
}

/// An inbound customer message as handed over by a transport webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel: String,
    /// Raw origin identifier: a phone number in any format, or a short code
    /// or alphanumeric sender ID for automated senders.
    pub from: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// What the generator is allowed to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "category")]
pub enum ResponseScope {
    /// Normal automated handling.
    Full,
    /// Staff is handling the conversation; answer only this factual question.
    SimpleQueryOnly(QueryCategory),
}

/// Closure details passed to the generator while the business is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureContext {
    pub message: String,
    pub return_date_hint: Option<String>,
}

/// Request handed to the external response generator.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub customer_message: String,
    pub conversation_id: ConversationId,
    pub customer_phone: PhoneNumber,
    /// Recent history, oldest first.
    pub history: Vec<Message>,
    pub scope: ResponseScope,
    pub closure: Option<ClosureContext>,
}

/// Reply produced by the external response generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    /// Message segments, sent one transport call each.
    pub responses: Vec<String>,
    pub provider: String,
    pub model: String,
    /// Opaque 0-100 score; only compared against the escalation threshold.
    pub confidence: u8,
    pub context: Option<String>,
}

/// Result of a single transport send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub sent: bool,
    pub provider: String,
    pub error: Option<String>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Generator,
    Transport,
    Storage,
}
