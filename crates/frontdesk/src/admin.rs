// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands against the conversation store: listing and inspecting
//! conversations, manual mode control, the kill switch, one-off sweeps and
//! the alert log.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use frontdesk_agent::{ConversationView, ModeController};
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{
    Alert, Conversation, ConversationId, ConversationStatus, ConversationStore, FrontdeskError,
};
use frontdesk_storage::SqliteStore;
use frontdesk_throttle::MessageBatcher;

/// Mode control over a store, without the inbound pipeline.
pub struct Admin {
    store: Arc<dyn ConversationStore>,
    modes: ModeController,
}

impl Admin {
    pub fn new(store: Arc<dyn ConversationStore>, config: &FrontdeskConfig) -> Self {
        // No messages flow through an operator session; the batcher only
        // satisfies the controller's cancel-on-transition contract.
        let batcher = Arc::new(MessageBatcher::new(
            Duration::from_millis(config.batching.window_ms),
            config.batching.enabled,
        ));
        let modes = ModeController::new(
            Arc::clone(&store),
            batcher,
            config.mode.staff_cooldown_minutes,
        );
        Self { store, modes }
    }

    /// Open the configured SQLite database.
    pub async fn open(config: &FrontdeskConfig) -> Result<Self, FrontdeskError> {
        let store = Arc::new(SqliteStore::new(config.storage.clone()));
        store.initialize().await?;
        Ok(Self::new(store, config))
    }

    pub async fn close(&self) -> Result<(), FrontdeskError> {
        self.store.close().await
    }

    pub async fn list(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<Conversation>, FrontdeskError> {
        self.store.list_conversations(status).await
    }

    pub async fn show(
        &self,
        id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<ConversationView, FrontdeskError> {
        self.modes.snapshot(id, now).await
    }

    pub async fn resume(
        &self,
        id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        self.modes.resume(id, now).await
    }

    pub async fn takeover(
        &self,
        id: &ConversationId,
        assignee: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        self.modes.takeover(id, assignee, now).await
    }

    pub async fn archive(
        &self,
        id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        self.modes.archive(id, now).await
    }

    pub async fn pause_all(&self, now: DateTime<Utc>) -> Result<usize, FrontdeskError> {
        self.modes.pause_all(now).await
    }

    pub async fn resume_all(&self, now: DateTime<Utc>) -> Result<usize, FrontdeskError> {
        self.modes.resume_all(now).await
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, FrontdeskError> {
        self.modes.reset_stale_manual(now).await
    }

    pub async fn alerts(&self, limit: usize) -> Result<Vec<Alert>, FrontdeskError> {
        self.store.list_alerts(limit).await
    }
}

/// One table row per conversation.
pub fn conversation_row(conversation: &Conversation) -> String {
    format!(
        "{:<36}  {:<8}  {:<7}  {:<12}  {}",
        conversation.id.to_string(),
        conversation.status.to_string(),
        conversation.channel,
        conversation.assigned_to.as_deref().unwrap_or("-"),
        conversation.updated_at.format("%Y-%m-%d %H:%M"),
    )
}

pub fn conversation_header() -> String {
    format!(
        "{:<36}  {:<8}  {:<7}  {:<12}  {}",
        "ID", "STATUS", "CHANNEL", "ASSIGNED", "UPDATED"
    )
}

/// Multi-line description of a conversation's mode.
pub fn describe_view(view: &ConversationView) -> String {
    let conversation = &view.conversation;
    let mut lines = vec![
        format!("conversation  {}", conversation.id),
        format!("customer      {}", conversation.customer_id),
        format!("channel       {}", conversation.channel),
        format!("status        {}", conversation.status),
    ];
    if let Some(prior) = conversation.paused_from {
        lines.push(format!("paused from   {prior}"));
    }
    if let Some(assignee) = &conversation.assigned_to {
        lines.push(format!("assigned to   {assignee}"));
    }
    match view.last_staff_message_at {
        Some(at) => lines.push(format!("last staff    {}", at.format("%Y-%m-%d %H:%M"))),
        None => lines.push("last staff    never".to_string()),
    }
    if let Some(remaining) = view.cooldown_remaining_minutes {
        lines.push(format!("auto in       {remaining} min"));
    }
    lines.join("\n")
}

pub fn alert_row(alert: &Alert) -> String {
    format!(
        "{}  {:<16}  {:<36}  {}",
        alert.created_at.format("%Y-%m-%d %H:%M"),
        alert.alert_type.to_string(),
        alert.conversation_id.to_string(),
        alert.notified_to,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use frontdesk_core::{AlertType, PhoneNumber};
    use frontdesk_test_utils::MemoryStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    async fn seeded() -> (Admin, Arc<MemoryStore>, Conversation) {
        let store = Arc::new(MemoryStore::new());
        let phone = PhoneNumber::parse("07700 900123").unwrap();
        let customer = store.find_or_create_customer(&phone, t0()).await.unwrap();
        let conversation = store
            .find_or_create_conversation(&customer.id, "sms", t0())
            .await
            .unwrap();
        let admin = Admin::new(
            Arc::clone(&store) as Arc<dyn ConversationStore>,
            &FrontdeskConfig::default(),
        );
        (admin, store, conversation)
    }

    #[tokio::test]
    async fn takeover_then_show_reports_cooldown() {
        let (admin, _store, conversation) = seeded().await;
        let taken = admin
            .takeover(&conversation.id, "John", t0())
            .await
            .unwrap();
        assert_eq!(taken.status, ConversationStatus::Manual);

        let view = admin
            .show(&conversation.id, t0() + chrono::Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(view.cooldown_remaining_minutes, Some(20));
        let text = describe_view(&view);
        assert!(text.contains("assigned to   John"));
        assert!(text.contains("auto in       20 min"));
    }

    #[tokio::test]
    async fn kill_switch_round_trip_restores_status() {
        let (admin, _store, conversation) = seeded().await;
        admin.takeover(&conversation.id, "John", t0()).await.unwrap();

        assert_eq!(admin.pause_all(t0()).await.unwrap(), 1);
        let paused = admin.list(Some(ConversationStatus::Paused)).await.unwrap();
        assert_eq!(paused.len(), 1);

        assert_eq!(admin.resume_all(t0()).await.unwrap(), 1);
        let restored = admin.list(Some(ConversationStatus::Manual)).await.unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[tokio::test]
    async fn sweep_returns_lapsed_manual_conversations() {
        let (admin, _store, conversation) = seeded().await;
        admin.takeover(&conversation.id, "John", t0()).await.unwrap();
        assert_eq!(admin.sweep(t0() + chrono::Duration::minutes(29)).await.unwrap(), 0);
        assert_eq!(admin.sweep(t0() + chrono::Duration::minutes(30)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn archive_rejects_unknown_conversation() {
        let (admin, _store, _conversation) = seeded().await;
        let err = admin
            .archive(&ConversationId("nope".to_string()), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, FrontdeskError::NotFound { .. }));
    }

    #[tokio::test]
    async fn alerts_render_one_row_each() {
        let (admin, store, conversation) = seeded().await;
        store
            .insert_alert(&Alert {
                id: "a1".to_string(),
                conversation_id: conversation.id.clone(),
                alert_type: AlertType::ManualRequired,
                notified_to: "+447700900999".to_string(),
                created_at: t0(),
            })
            .await
            .unwrap();
        let alerts = admin.alerts(10).await.unwrap();
        assert_eq!(alerts.len(), 1);
        let row = alert_row(&alerts[0]);
        assert!(row.contains("manual_required"));
        assert!(row.contains("+447700900999"));
    }

    #[test]
    fn header_and_rows_line_up() {
        let conversation = Conversation::new(
            frontdesk_core::CustomerId("cust".to_string()),
            "sms",
            t0(),
        );
        let header = conversation_header();
        let row = conversation_row(&conversation);
        assert_eq!(header.find("STATUS"), row.find("auto"));
    }
}
