// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the inbound pipeline over a real SQLite database.
//!
//! Each test opens its own temp-file store, so tests are independent and
//! order-insensitive. Generation and delivery use the mock adapters.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use frontdesk_agent::{HoldReason, InboundOutcome, InboundPipeline};
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{
    ConversationStatus, ConversationStore, InboundMessage, ResponseGenerator, Sender,
    TransportSender,
};
use frontdesk_storage::SqliteStore;
use frontdesk_test_utils::{MockGenerator, MockTransport};
use tempfile::TempDir;

const CUSTOMER: &str = "07700 900123";
const CUSTOMER_E164: &str = "+447700900123";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

fn mins(n: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(n)
}

fn config_for(path: &Path) -> FrontdeskConfig {
    let mut config = FrontdeskConfig::default();
    config.storage.database_path = path.to_string_lossy().into_owned();
    config.batching.enabled = false;
    config.escalation.notify_to = vec!["07700 900999".to_string()];
    config
}

struct Stack {
    pipeline: InboundPipeline,
    store: Arc<SqliteStore>,
    transport: Arc<MockTransport>,
}

async fn open(config: &FrontdeskConfig) -> Stack {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await.unwrap();
    let transport = Arc::new(MockTransport::new());
    let pipeline = InboundPipeline::new(
        config,
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::new(MockGenerator::new()) as Arc<dyn ResponseGenerator>,
        Arc::clone(&transport) as Arc<dyn TransportSender>,
    );
    Stack {
        pipeline,
        store,
        transport,
    }
}

fn inbound(text: &str, at: DateTime<Utc>) -> InboundMessage {
    InboundMessage {
        channel: "sms".to_string(),
        from: CUSTOMER.to_string(),
        text: text.to_string(),
        received_at: at,
    }
}

fn temp_db() -> (TempDir, FrontdeskConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("frontdesk.db"));
    (dir, config)
}

#[tokio::test]
async fn reply_is_sent_and_persisted() {
    let (_dir, config) = temp_db();
    let stack = open(&config).await;

    let outcome = stack
        .pipeline
        .handle_inbound(inbound("can you check on my laptop for me", t0()))
        .await
        .unwrap();
    let InboundOutcome::Responded {
        conversation_id,
        segments,
        ..
    } = outcome
    else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert_eq!(segments, 1);
    assert_eq!(stack.transport.sent_to(CUSTOMER_E164).await.len(), 1);

    let history = stack
        .store
        .recent_messages(&conversation_id, 10)
        .await
        .unwrap();
    let senders: Vec<Sender> = history.iter().map(|m| m.sender).collect();
    assert_eq!(senders, [Sender::Customer, Sender::Ai]);
    assert_eq!(history[1].delivery_status.as_deref(), Some("sent"));
}

#[tokio::test]
async fn staff_takeover_survives_restart() {
    let (_dir, config) = temp_db();
    {
        let stack = open(&config).await;
        let InboundOutcome::Responded {
            conversation_id, ..
        } = stack
            .pipeline
            .handle_inbound(inbound("can you check on my laptop for me", t0()))
            .await
            .unwrap()
        else {
            panic!("expected a reply");
        };
        let reply = stack
            .pipeline
            .record_staff_message(&conversation_id, "Hi Sarah, I'll take a look now. John", mins(1))
            .await
            .unwrap();
        assert!(reply.transition.is_some());
        stack.store.close().await.unwrap();
    }

    let stack = open(&config).await;
    let manual = stack
        .store
        .list_conversations(Some(ConversationStatus::Manual))
        .await
        .unwrap();
    assert_eq!(manual.len(), 1);

    let held = stack
        .pipeline
        .handle_inbound(inbound("is my laptop ready yet", mins(6)))
        .await
        .unwrap();
    assert!(
        matches!(
            held,
            InboundOutcome::Held {
                reason: HoldReason::StaffCooldown,
                cooldown_remaining_minutes: Some(25),
                ..
            }
        ),
        "got {held:?}"
    );
    assert!(stack.transport.sent_to(CUSTOMER_E164).await.is_empty());

    let released = stack
        .pipeline
        .handle_inbound(inbound("hello? is my laptop ready yet", mins(32)))
        .await
        .unwrap();
    assert!(matches!(released, InboundOutcome::Responded { .. }), "got {released:?}");
    let back = stack
        .store
        .get_conversation(&manual[0].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(back.status, ConversationStatus::Auto);
}

#[tokio::test]
async fn kill_switch_holds_everything_until_released() {
    let (_dir, config) = temp_db();
    let stack = open(&config).await;
    stack
        .pipeline
        .handle_inbound(inbound("can you check on my laptop for me", t0()))
        .await
        .unwrap();

    let paused = stack.pipeline.modes().pause_all(mins(1)).await.unwrap();
    assert_eq!(paused, 1);

    let held = stack
        .pipeline
        .handle_inbound(inbound("any update?", mins(2)))
        .await
        .unwrap();
    assert!(
        matches!(
            held,
            InboundOutcome::Held {
                reason: HoldReason::Paused,
                ..
            }
        ),
        "got {held:?}"
    );
    assert_eq!(stack.transport.sent_to(CUSTOMER_E164).await.len(), 1);

    let resumed = stack.pipeline.modes().resume_all(mins(3)).await.unwrap();
    assert_eq!(resumed, 1);
    let auto = stack
        .store
        .list_conversations(Some(ConversationStatus::Auto))
        .await
        .unwrap();
    assert_eq!(auto.len(), 1);
    assert!(auto[0].paused_from.is_none());
}
