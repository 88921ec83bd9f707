// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff escalation with per-conversation cooldown.
//!
//! Every alert, whatever its type, counts toward the cooldown of the next
//! one for the same conversation. High-priority alerts use a shorter window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use frontdesk_config::model::{BusinessConfig, EscalationConfig};
use frontdesk_core::{
    Alert, AlertType, ConversationId, ConversationStore, FrontdeskError, PhoneNormalizer,
    PhoneNumber, TransportSender,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::recording;

/// Longest customer excerpt quoted in an alert, in characters.
const EXCERPT_CHARS: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub cooldown: Duration,
    pub high_priority_cooldown: Duration,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            cooldown: Duration::minutes(15),
            high_priority_cooldown: Duration::minutes(5),
        }
    }
}

impl EscalationPolicy {
    pub fn from_config(config: &EscalationConfig) -> Self {
        Self {
            cooldown: Duration::minutes(config.cooldown_minutes),
            high_priority_cooldown: Duration::minutes(config.high_priority_cooldown_minutes),
        }
    }

    pub fn cooldown_for(&self, alert_type: AlertType) -> Duration {
        match alert_type {
            AlertType::HighPriority => self.high_priority_cooldown,
            _ => self.cooldown,
        }
    }

    /// Whether a new alert may go out, given the conversation's most
    /// recent alert of any type.
    pub fn should_notify(
        &self,
        alert_type: AlertType,
        last_alert_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        last_alert_at.is_none_or(|last| now - last >= self.cooldown_for(alert_type))
    }
}

/// The conversation being escalated.
#[derive(Debug, Clone)]
pub struct EscalationRequest<'a> {
    pub conversation_id: &'a ConversationId,
    pub alert_type: AlertType,
    pub customer_phone: &'a PhoneNumber,
    pub customer_name: Option<&'a str>,
    pub last_message: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotifyOutcome {
    Sent {
        alert_type: AlertType,
        /// Recipients that accepted the alert. Zero when none are
        /// configured and the alert is only recorded for the dashboard.
        recipients: usize,
    },
    Suppressed {
        alert_type: AlertType,
        next_allowed_at: DateTime<Utc>,
    },
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent { .. })
    }
}

/// Sends staff alerts and records them.
pub struct EscalationDispatcher {
    store: Arc<dyn ConversationStore>,
    transport: Arc<dyn TransportSender>,
    policy: EscalationPolicy,
    channel: String,
    recipients: Vec<PhoneNumber>,
    business_name: String,
    dashboard_url: Option<String>,
    normalizer: PhoneNormalizer,
}

impl EscalationDispatcher {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        transport: Arc<dyn TransportSender>,
        business: &BusinessConfig,
        config: &EscalationConfig,
        normalizer: PhoneNormalizer,
    ) -> Self {
        let recipients = config
            .notify_to
            .iter()
            .filter_map(|raw| {
                let parsed = normalizer.parse(raw);
                if parsed.is_none() {
                    warn!(recipient = %raw, "ignoring unusable escalation recipient");
                }
                parsed
            })
            .collect();
        Self {
            store,
            transport,
            policy: EscalationPolicy::from_config(config),
            channel: config.channel.clone(),
            recipients,
            business_name: business.name.clone(),
            dashboard_url: config
                .dashboard_url
                .as_deref()
                .map(|u| u.trim_end_matches('/').to_string()),
            normalizer,
        }
    }

    pub fn policy(&self) -> EscalationPolicy {
        self.policy
    }

    /// Alert staff unless the conversation is inside its cooldown.
    ///
    /// The alert is recorded only once at least one recipient accepted it,
    /// so a delivery failure does not start a cooldown.
    pub async fn notify(
        &self,
        request: EscalationRequest<'_>,
        now: DateTime<Utc>,
    ) -> Result<NotifyOutcome, FrontdeskError> {
        let alert_type = request.alert_type;
        let last = self.store.last_alert(request.conversation_id).await?;
        let last_at = last.as_ref().map(|a| a.created_at);
        if !self.policy.should_notify(alert_type, last_at, now) {
            let next_allowed_at =
                last_at.unwrap_or(now) + self.policy.cooldown_for(alert_type);
            debug!(
                conversation_id = %request.conversation_id,
                %alert_type,
                %next_allowed_at,
                "escalation suppressed by cooldown"
            );
            recording::record_escalation(&alert_type.to_string(), "suppressed");
            return Ok(NotifyOutcome::Suppressed {
                alert_type,
                next_allowed_at,
            });
        }

        let body = self.format_alert(&request);
        let mut delivered = Vec::new();
        let mut last_error = None;
        for recipient in &self.recipients {
            match self
                .transport
                .send(&self.channel, recipient.as_str(), &body)
                .await
            {
                Ok(receipt) if receipt.sent => delivered.push(recipient.as_str()),
                Ok(receipt) => {
                    let error = receipt.error.unwrap_or_else(|| "not sent".to_string());
                    warn!(recipient = %recipient, %error, "escalation delivery failed");
                    last_error = Some(error);
                }
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "escalation delivery failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        if delivered.is_empty()
            && let Some(error) = last_error
        {
            recording::record_escalation(&alert_type.to_string(), "failed");
            return Err(FrontdeskError::Transport {
                message: format!("escalation not delivered: {error}"),
                source: None,
            });
        }

        let notified_to = if delivered.is_empty() {
            "dashboard".to_string()
        } else {
            delivered.join(",")
        };
        self.store
            .insert_alert(&Alert {
                id: uuid::Uuid::new_v4().to_string(),
                conversation_id: request.conversation_id.clone(),
                alert_type,
                notified_to,
                created_at: now,
            })
            .await?;

        recording::record_escalation(&alert_type.to_string(), "sent");
        info!(
            conversation_id = %request.conversation_id,
            %alert_type,
            recipients = delivered.len(),
            "staff escalated"
        );
        Ok(NotifyOutcome::Sent {
            alert_type,
            recipients: delivered.len(),
        })
    }

    pub fn format_alert(&self, request: &EscalationRequest<'_>) -> String {
        let who = match request.customer_name {
            Some(name) => format!(
                "{name} ({})",
                self.normalizer
                    .format_for_display(request.customer_phone.as_str())
            ),
            None => self
                .normalizer
                .format_for_display(request.customer_phone.as_str()),
        };

        let headline = match request.alert_type {
            AlertType::ManualRequired => format!("Customer waiting for staff: {who}"),
            AlertType::LowConfidence => format!("Please check the automated reply to {who}"),
            AlertType::HighPriority => format!("URGENT: {who} needs attention now"),
            AlertType::MissedCall => format!("Missed call from {who}"),
        };

        let mut body = format!("[{}] {headline}", self.business_name);
        if let Some(text) = request.last_message.map(str::trim).filter(|t| !t.is_empty()) {
            body.push_str("\n\"");
            body.push_str(&excerpt(text));
            body.push('"');
        }
        if let Some(url) = &self.dashboard_url {
            body.push('\n');
            body.push_str(url);
            body.push_str("/conversations/");
            body.push_str(request.conversation_id.as_str());
        }
        body
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use frontdesk_test_utils::{MemoryStore, MockTransport};
    use tracing_test::traced_test;

    const STAFF: &str = "+447700900999";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        transport: Arc<MockTransport>,
        dispatcher: EscalationDispatcher,
        conversation_id: ConversationId,
        phone: PhoneNumber,
    }

    async fn fixture(dashboard_url: Option<&str>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(MockTransport::new());
        let phone = PhoneNumber::parse("07700 900123").unwrap();
        let customer = store.find_or_create_customer(&phone, t0()).await.unwrap();
        let conversation = store
            .find_or_create_conversation(&customer.id, "sms", t0())
            .await
            .unwrap();
        let config = EscalationConfig {
            notify_to: vec!["07700 900999".to_string(), "not a number".to_string()],
            dashboard_url: dashboard_url.map(str::to_string),
            ..EscalationConfig::default()
        };
        let dispatcher = EscalationDispatcher::new(
            Arc::clone(&store) as Arc<dyn ConversationStore>,
            Arc::clone(&transport) as Arc<dyn TransportSender>,
            &BusinessConfig::default(),
            &config,
            PhoneNormalizer::default(),
        );
        Fixture {
            store,
            transport,
            dispatcher,
            conversation_id: conversation.id,
            phone,
        }
    }

    fn request<'a>(f: &'a Fixture, alert_type: AlertType) -> EscalationRequest<'a> {
        EscalationRequest {
            conversation_id: &f.conversation_id,
            alert_type,
            customer_phone: &f.phone,
            customer_name: Some("Sarah"),
            last_message: Some("is my laptop ready?"),
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn alerts_share_one_cooldown_per_conversation() {
        let f = fixture(None).await;

        let first = f
            .dispatcher
            .notify(request(&f, AlertType::ManualRequired), t0())
            .await
            .unwrap();
        assert_eq!(
            first,
            NotifyOutcome::Sent {
                alert_type: AlertType::ManualRequired,
                recipients: 1
            }
        );

        let low = f
            .dispatcher
            .notify(request(&f, AlertType::LowConfidence), t0() + Duration::minutes(10))
            .await
            .unwrap();
        assert!(!low.is_sent());
        assert!(logs_contain("escalation suppressed by cooldown"));

        let urgent_early = f
            .dispatcher
            .notify(request(&f, AlertType::HighPriority), t0() + Duration::minutes(4))
            .await
            .unwrap();
        assert_eq!(
            urgent_early,
            NotifyOutcome::Suppressed {
                alert_type: AlertType::HighPriority,
                next_allowed_at: t0() + Duration::minutes(5)
            }
        );
        let urgent = f
            .dispatcher
            .notify(request(&f, AlertType::HighPriority), t0() + Duration::minutes(5))
            .await
            .unwrap();
        assert!(urgent.is_sent());

        let alerts = f.store.alerts().await;
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].notified_to, STAFF);
        assert_eq!(f.transport.sent_to(STAFF).await.len(), 2);
    }

    #[tokio::test]
    async fn failed_delivery_records_no_alert() {
        let f = fixture(None).await;
        f.transport.fail_for(STAFF).await;
        let result = f
            .dispatcher
            .notify(request(&f, AlertType::ManualRequired), t0())
            .await;
        assert!(matches!(result, Err(FrontdeskError::Transport { .. })));
        assert!(f.store.alerts().await.is_empty());

        f.transport.recover(STAFF).await;
        let retry = f
            .dispatcher
            .notify(request(&f, AlertType::ManualRequired), t0() + Duration::minutes(1))
            .await
            .unwrap();
        assert!(retry.is_sent());
    }

    #[tokio::test]
    async fn alert_body_names_customer_and_links_dashboard() {
        let f = fixture(Some("https://desk.example.com/")).await;
        let body = f.dispatcher.format_alert(&request(&f, AlertType::ManualRequired));
        assert!(body.starts_with("[Frontdesk] Customer waiting for staff: Sarah (07700 900123)"));
        assert!(body.contains("\"is my laptop ready?\""));
        assert!(body.ends_with(&format!(
            "https://desk.example.com/conversations/{}",
            f.conversation_id
        )));
    }

    #[test]
    fn first_alert_always_allowed() {
        let policy = EscalationPolicy::default();
        assert!(policy.should_notify(AlertType::ManualRequired, None, t0()));
    }

    #[test]
    fn standard_cooldown_is_fifteen_minutes() {
        let policy = EscalationPolicy::default();
        let last = Some(t0());
        assert!(!policy.should_notify(AlertType::ManualRequired, last, t0() + Duration::minutes(14)));
        assert!(policy.should_notify(AlertType::ManualRequired, last, t0() + Duration::minutes(15)));
        assert!(!policy.should_notify(AlertType::LowConfidence, last, t0() + Duration::minutes(10)));
    }

    #[test]
    fn high_priority_uses_short_cooldown() {
        let policy = EscalationPolicy::default();
        let last = Some(t0());
        assert!(!policy.should_notify(AlertType::HighPriority, last, t0() + Duration::minutes(4)));
        assert!(policy.should_notify(AlertType::HighPriority, last, t0() + Duration::minutes(5)));
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 3);
        assert_eq!(excerpt("short"), "short");
    }
}
