// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the frontdesk messaging pipeline.
//!
//! This crate provides the error type, the shared domain types (customers,
//! conversations, messages, alerts), canonical phone identity, and the traits
//! through which the pipeline talks to its external collaborators: the
//! response generator, the outbound transport and the persistent store.

pub mod error;
pub mod phone;
pub mod traits;
pub mod types;

pub use error::FrontdeskError;
pub use phone::{PhoneNormalizer, PhoneNumber};
pub use types::{
    AdapterType, Alert, AlertType, ClosureContext, Conversation, ConversationId,
    ConversationStatus, Customer, CustomerId, DeliveryReceipt, GeneratedResponse,
    GenerationRequest, HealthStatus, InboundMessage, Message, MessageId, QueryCategory,
    ResponseScope, Sender,
};

pub use traits::{ConversationStore, PluginAdapter, ResponseGenerator, TransportSender};
