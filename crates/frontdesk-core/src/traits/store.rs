// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent store trait for customers, conversations, messages and alerts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FrontdeskError;
use crate::phone::PhoneNumber;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Alert, Conversation, ConversationId, ConversationStatus, Customer, CustomerId, Message,
    MessageId, Sender,
};

/// Durable source of truth for conversation state.
///
/// Conversation `status` lives here, not in process memory: every mode
/// transition is written back through [`update_conversation`] before the
/// pipeline acts on it.
///
/// [`update_conversation`]: ConversationStore::update_conversation
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Opens connections, runs migrations.
    async fn initialize(&self) -> Result<(), FrontdeskError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), FrontdeskError>;

    // --- Customers ---

    async fn find_or_create_customer(
        &self,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<Customer, FrontdeskError>;

    async fn get_customer(&self, id: &CustomerId) -> Result<Option<Customer>, FrontdeskError>;

    /// Sets name and/or email; `None` leaves the existing value untouched.
    async fn update_customer_contact(
        &self,
        id: &CustomerId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), FrontdeskError>;

    // --- Conversations ---

    /// Latest non-archived conversation for the customer on `channel`, or a
    /// new `auto` conversation when there is none.
    async fn find_or_create_conversation(
        &self,
        customer_id: &CustomerId,
        channel: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError>;

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, FrontdeskError>;

    async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<Conversation>, FrontdeskError>;

    /// Persists `status`, `paused_from`, `assigned_to` and `updated_at`,
    /// provided the stored status is still `expected`. A concurrent change
    /// yields [`FrontdeskError::StatusConflict`] and writes nothing.
    async fn update_conversation(
        &self,
        conversation: &Conversation,
        expected: ConversationStatus,
    ) -> Result<(), FrontdeskError>;

    // --- Messages ---

    async fn insert_message(&self, message: &Message) -> Result<(), FrontdeskError>;

    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>, FrontdeskError>;

    async fn update_message_sender(
        &self,
        id: &MessageId,
        sender: Sender,
    ) -> Result<(), FrontdeskError>;

    /// The most recent `limit` messages, returned oldest first.
    async fn recent_messages(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, FrontdeskError>;

    async fn last_message_at(
        &self,
        conversation_id: &ConversationId,
        sender: Sender,
    ) -> Result<Option<DateTime<Utc>>, FrontdeskError>;

    // --- Alerts ---

    async fn insert_alert(&self, alert: &Alert) -> Result<(), FrontdeskError>;

    /// Most recent alert of any type for the conversation.
    async fn last_alert(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Alert>, FrontdeskError>;

    /// Most recent alerts across all conversations, newest first.
    async fn list_alerts(&self, limit: usize) -> Result<Vec<Alert>, FrontdeskError>;
}
