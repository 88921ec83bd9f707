// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store.
//!
//! Mirrors the ordering rules of the SQLite store (newest by timestamp,
//! insertion order breaking ties) without leaving the tokio runtime, so
//! tests can run under paused time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use frontdesk_core::{
    AdapterType, Alert, Conversation, ConversationId, ConversationStatus, ConversationStore,
    Customer, CustomerId, FrontdeskError, HealthStatus, Message, MessageId, PhoneNumber,
    PluginAdapter, Sender,
};

#[derive(Default)]
struct Tables {
    customers: Vec<Customer>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    alerts: Vec<Alert>,
}

/// A [`ConversationStore`] backed by vectors behind a mutex.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn customer_count(&self) -> usize {
        self.tables.lock().await.customers.len()
    }

    pub async fn conversation_count(&self) -> usize {
        self.tables.lock().await.conversations.len()
    }

    pub async fn message_count(&self) -> usize {
        self.tables.lock().await.messages.len()
    }

    /// Every message of a conversation in insertion order.
    pub async fn messages(&self, conversation_id: &ConversationId) -> Vec<Message> {
        self.tables
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect()
    }

    /// Every alert in insertion order.
    pub async fn alerts(&self) -> Vec<Alert> {
        self.tables.lock().await.alerts.clone()
    }
}

fn not_found(entity: &'static str, id: impl ToString) -> FrontdeskError {
    FrontdeskError::NotFound {
        entity,
        id: id.to_string(),
    }
}

/// Index of the newest element by `key`, later insertions winning ties.
fn newest<T, K: Ord>(items: &[T], pred: impl Fn(&T) -> bool, key: impl Fn(&T) -> K) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| pred(item))
        .max_by(|(ia, a), (ib, b)| key(a).cmp(&key(b)).then(ia.cmp(ib)))
        .map(|(i, _)| i)
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FrontdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FrontdeskError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn initialize(&self) -> Result<(), FrontdeskError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), FrontdeskError> {
        Ok(())
    }

    async fn find_or_create_customer(
        &self,
        phone: &PhoneNumber,
        now: DateTime<Utc>,
    ) -> Result<Customer, FrontdeskError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables.customers.iter().find(|c| &c.phone == phone) {
            return Ok(existing.clone());
        }
        let customer = Customer {
            id: CustomerId::generate(),
            phone: phone.clone(),
            name: None,
            email: None,
            created_at: now,
        };
        tables.customers.push(customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, id: &CustomerId) -> Result<Option<Customer>, FrontdeskError> {
        let tables = self.tables.lock().await;
        Ok(tables.customers.iter().find(|c| &c.id == id).cloned())
    }

    async fn update_customer_contact(
        &self,
        id: &CustomerId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<(), FrontdeskError> {
        let mut tables = self.tables.lock().await;
        let customer = tables
            .customers
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| not_found("customer", id))?;
        if let Some(name) = name {
            customer.name = Some(name.to_string());
        }
        if let Some(email) = email {
            customer.email = Some(email.to_string());
        }
        Ok(())
    }

    async fn find_or_create_conversation(
        &self,
        customer_id: &CustomerId,
        channel: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        let mut tables = self.tables.lock().await;
        let open = newest(
            &tables.conversations,
            |c| {
                &c.customer_id == customer_id
                    && c.channel == channel
                    && c.status != ConversationStatus::Archived
            },
            |c| c.updated_at,
        );
        if let Some(i) = open {
            return Ok(tables.conversations[i].clone());
        }
        let conversation = Conversation::new(customer_id.clone(), channel, now);
        tables.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, FrontdeskError> {
        let tables = self.tables.lock().await;
        Ok(tables.conversations.iter().find(|c| &c.id == id).cloned())
    }

    async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<Conversation>, FrontdeskError> {
        let tables = self.tables.lock().await;
        let mut listed: Vec<(usize, Conversation)> = tables
            .conversations
            .iter()
            .enumerate()
            .filter(|(_, c)| status.is_none_or(|s| c.status == s))
            .map(|(i, c)| (i, c.clone()))
            .collect();
        listed.sort_by(|(ia, a), (ib, b)| b.updated_at.cmp(&a.updated_at).then(ib.cmp(ia)));
        Ok(listed.into_iter().map(|(_, c)| c).collect())
    }

    async fn update_conversation(
        &self,
        conversation: &Conversation,
        expected: ConversationStatus,
    ) -> Result<(), FrontdeskError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation.id)
            .ok_or_else(|| not_found("conversation", &conversation.id))?;
        if stored.status != expected {
            return Err(FrontdeskError::StatusConflict {
                id: conversation.id.to_string(),
                expected,
            });
        }
        stored.status = conversation.status;
        stored.paused_from = conversation.paused_from;
        stored.assigned_to = conversation.assigned_to.clone();
        stored.updated_at = conversation.updated_at;
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<(), FrontdeskError> {
        let mut tables = self.tables.lock().await;
        if !tables
            .conversations
            .iter()
            .any(|c| c.id == message.conversation_id)
        {
            return Err(not_found("conversation", &message.conversation_id));
        }
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn get_message(&self, id: &MessageId) -> Result<Option<Message>, FrontdeskError> {
        let tables = self.tables.lock().await;
        Ok(tables.messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn update_message_sender(
        &self,
        id: &MessageId,
        sender: Sender,
    ) -> Result<(), FrontdeskError> {
        let mut tables = self.tables.lock().await;
        let message = tables
            .messages
            .iter_mut()
            .find(|m| &m.id == id)
            .ok_or_else(|| not_found("message", id))?;
        message.sender = sender;
        Ok(())
    }

    async fn recent_messages(
        &self,
        conversation_id: &ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, FrontdeskError> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<(usize, &Message)> = tables
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| &m.conversation_id == conversation_id)
            .collect();
        matching.sort_by(|(ia, a), (ib, b)| a.created_at.cmp(&b.created_at).then(ia.cmp(ib)));
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).map(|(_, m)| m.clone()).collect())
    }

    async fn last_message_at(
        &self,
        conversation_id: &ConversationId,
        sender: Sender,
    ) -> Result<Option<DateTime<Utc>>, FrontdeskError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id && m.sender == sender)
            .map(|m| m.created_at)
            .max())
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), FrontdeskError> {
        self.tables.lock().await.alerts.push(alert.clone());
        Ok(())
    }

    async fn last_alert(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<Alert>, FrontdeskError> {
        let tables = self.tables.lock().await;
        Ok(newest(
            &tables.alerts,
            |a| &a.conversation_id == conversation_id,
            |a| a.created_at,
        )
        .map(|i| tables.alerts[i].clone()))
    }

    async fn list_alerts(&self, limit: usize) -> Result<Vec<Alert>, FrontdeskError> {
        let tables = self.tables.lock().await;
        let mut alerts: Vec<(usize, Alert)> = tables.alerts.iter().cloned().enumerate().collect();
        alerts.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        Ok(alerts.into_iter().take(limit).map(|(_, a)| a).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn recent_messages_are_oldest_first() {
        let store = MemoryStore::new();
        let phone = PhoneNumber::parse("07700 900123").unwrap();
        let customer = store.find_or_create_customer(&phone, t0()).await.unwrap();
        let conv = store
            .find_or_create_conversation(&customer.id, "sms", t0())
            .await
            .unwrap();
        for i in 0..4 {
            let msg = Message::new(
                conv.id.clone(),
                Sender::Customer,
                format!("m{i}"),
                t0() + Duration::minutes(i),
            );
            store.insert_message(&msg).await.unwrap();
        }
        let recent = store.recent_messages(&conv.id, 2).await.unwrap();
        let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["m2", "m3"]);
    }

    #[tokio::test]
    async fn message_for_unknown_conversation_is_rejected() {
        let store = MemoryStore::new();
        let msg = Message::new(ConversationId("nope".into()), Sender::Customer, "hi", t0());
        assert!(store.insert_message(&msg).await.is_err());
        assert_eq!(store.message_count().await, 0);
    }
}
