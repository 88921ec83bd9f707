// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the SQLite store against a temp-file database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use frontdesk_config::model::StorageConfig;
use frontdesk_core::{
    Alert, AlertType, ConversationId, ConversationStatus, ConversationStore, CustomerId,
    FrontdeskError, Message, MessageId, PhoneNumber, Sender,
};
use frontdesk_storage::SqliteStore;
use tempfile::TempDir;

async fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frontdesk.db");
    let store = SqliteStore::new(StorageConfig {
        database_path: path.to_string_lossy().into_owned(),
        wal_mode: true,
    });
    store.initialize().await.unwrap();
    (dir, store)
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

fn phone(raw: &str) -> PhoneNumber {
    PhoneNumber::parse(raw).unwrap()
}

#[tokio::test]
async fn one_customer_per_phone() {
    let (_dir, store) = open_store().await;
    let a = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();
    let b = store
        .find_or_create_customer(&phone("+44 7700 900123"), t0() + Duration::minutes(5))
        .await
        .unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(b.created_at, t0());
    assert_eq!(b.phone.as_str(), "+447700900123");

    let other = store
        .find_or_create_customer(&phone("07700 900456"), t0())
        .await
        .unwrap();
    assert_ne!(a.id, other.id);
}

#[tokio::test]
async fn customer_contact_updates_keep_unset_fields() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();

    store
        .update_customer_contact(&customer.id, Some("Sarah"), None)
        .await
        .unwrap();
    store
        .update_customer_contact(&customer.id, None, Some("sarah@example.com"))
        .await
        .unwrap();

    let loaded = store.get_customer(&customer.id).await.unwrap().unwrap();
    assert_eq!(loaded.name.as_deref(), Some("Sarah"));
    assert_eq!(loaded.email.as_deref(), Some("sarah@example.com"));

    let missing = store
        .update_customer_contact(&CustomerId("nope".into()), Some("x"), None)
        .await;
    assert!(matches!(missing, Err(FrontdeskError::NotFound { entity: "customer", .. })));
}

#[tokio::test]
async fn conversation_is_reused_until_archived() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();

    let first = store
        .find_or_create_conversation(&customer.id, "sms", t0())
        .await
        .unwrap();
    assert_eq!(first.status, ConversationStatus::Auto);

    let again = store
        .find_or_create_conversation(&customer.id, "sms", t0() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(first.id, again.id);

    let whatsapp = store
        .find_or_create_conversation(&customer.id, "whatsapp", t0())
        .await
        .unwrap();
    assert_ne!(first.id, whatsapp.id);

    let mut archived = again.clone();
    archived.status = ConversationStatus::Archived;
    archived.updated_at = t0() + Duration::hours(2);
    store
        .update_conversation(&archived, ConversationStatus::Auto)
        .await
        .unwrap();

    let fresh = store
        .find_or_create_conversation(&customer.id, "sms", t0() + Duration::hours(3))
        .await
        .unwrap();
    assert_ne!(fresh.id, first.id);
    assert_eq!(fresh.status, ConversationStatus::Auto);
}

#[tokio::test]
async fn conversation_update_round_trips_mode_fields() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();
    let mut conv = store
        .find_or_create_conversation(&customer.id, "sms", t0())
        .await
        .unwrap();

    conv.status = ConversationStatus::Paused;
    conv.paused_from = Some(ConversationStatus::Manual);
    conv.assigned_to = Some("John".into());
    conv.updated_at = t0() + Duration::minutes(1);
    store
        .update_conversation(&conv, ConversationStatus::Auto)
        .await
        .unwrap();

    let loaded = store.get_conversation(&conv.id).await.unwrap().unwrap();
    assert_eq!(loaded, conv);

    let paused = store
        .list_conversations(Some(ConversationStatus::Paused))
        .await
        .unwrap();
    assert_eq!(paused.len(), 1);
    assert!(
        store
            .list_conversations(Some(ConversationStatus::Auto))
            .await
            .unwrap()
            .is_empty()
    );

    let mut ghost = conv.clone();
    ghost.id = ConversationId("ghost".into());
    assert!(matches!(
        store
            .update_conversation(&ghost, ConversationStatus::Paused)
            .await,
        Err(FrontdeskError::NotFound { entity: "conversation", .. })
    ));
}

#[tokio::test]
async fn conversation_update_rejects_stale_status() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();
    let original = store
        .find_or_create_conversation(&customer.id, "sms", t0())
        .await
        .unwrap();

    let mut paused = original.clone();
    paused.status = ConversationStatus::Paused;
    paused.paused_from = Some(ConversationStatus::Auto);
    paused.updated_at = t0() + Duration::minutes(1);
    store
        .update_conversation(&paused, ConversationStatus::Auto)
        .await
        .unwrap();

    // A writer still holding the auto copy must not clobber the pause.
    let mut stale = original.clone();
    stale.status = ConversationStatus::Manual;
    stale.updated_at = t0() + Duration::minutes(2);
    let err = store
        .update_conversation(&stale, ConversationStatus::Auto)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FrontdeskError::StatusConflict {
            expected: ConversationStatus::Auto,
            ..
        }
    ));

    let loaded = store.get_conversation(&original.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ConversationStatus::Paused);
    assert_eq!(loaded.paused_from, Some(ConversationStatus::Auto));
}

#[tokio::test]
async fn messages_history_and_sender_timestamps() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();
    let conv = store
        .find_or_create_conversation(&customer.id, "sms", t0())
        .await
        .unwrap();

    let senders = [Sender::Customer, Sender::Ai, Sender::Customer, Sender::Staff, Sender::Customer];
    for (i, sender) in senders.into_iter().enumerate() {
        let mut msg = Message::new(
            conv.id.clone(),
            sender,
            format!("message {i}"),
            t0() + Duration::minutes(i as i64),
        );
        if sender == Sender::Ai {
            msg.ai_confidence = Some(85);
        }
        store.insert_message(&msg).await.unwrap();
    }

    let recent = store.recent_messages(&conv.id, 3).await.unwrap();
    let texts: Vec<_> = recent.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["message 2", "message 3", "message 4"]);

    let all = store.recent_messages(&conv.id, 50).await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[1].ai_confidence, Some(85));

    assert_eq!(
        store.last_message_at(&conv.id, Sender::Staff).await.unwrap(),
        Some(t0() + Duration::minutes(3))
    );
    assert_eq!(
        store.last_message_at(&conv.id, Sender::Customer).await.unwrap(),
        Some(t0() + Duration::minutes(4))
    );
    assert_eq!(store.last_message_at(&conv.id, Sender::System).await.unwrap(), None);
}

#[tokio::test]
async fn message_sender_can_be_corrected() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();
    let conv = store
        .find_or_create_conversation(&customer.id, "sms", t0())
        .await
        .unwrap();
    let msg = Message::new(conv.id.clone(), Sender::Staff, "Thanks, AI Steve", t0());
    store.insert_message(&msg).await.unwrap();

    store.update_message_sender(&msg.id, Sender::Ai).await.unwrap();
    let loaded = store.get_message(&msg.id).await.unwrap().unwrap();
    assert_eq!(loaded.sender, Sender::Ai);
    assert_eq!(
        store.last_message_at(&conv.id, Sender::Staff).await.unwrap(),
        None
    );

    assert!(
        store
            .update_message_sender(&MessageId("missing".into()), Sender::Ai)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn alerts_latest_any_type_and_listing() {
    let (_dir, store) = open_store().await;
    let customer = store
        .find_or_create_customer(&phone("07700 900123"), t0())
        .await
        .unwrap();
    let conv = store
        .find_or_create_conversation(&customer.id, "sms", t0())
        .await
        .unwrap();
    assert!(store.last_alert(&conv.id).await.unwrap().is_none());

    for (i, alert_type) in [AlertType::ManualRequired, AlertType::LowConfidence]
        .into_iter()
        .enumerate()
    {
        store
            .insert_alert(&Alert {
                id: format!("alert-{i}"),
                conversation_id: conv.id.clone(),
                alert_type,
                notified_to: "+447700900999".into(),
                created_at: t0() + Duration::minutes(i as i64 * 10),
            })
            .await
            .unwrap();
    }

    let last = store.last_alert(&conv.id).await.unwrap().unwrap();
    assert_eq!(last.alert_type, AlertType::LowConfidence);
    assert_eq!(last.created_at, t0() + Duration::minutes(10));

    let listed = store.list_alerts(1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "alert-1");

    store.close().await.unwrap();
}
