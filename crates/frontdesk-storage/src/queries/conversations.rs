// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation queries.

use chrono::{DateTime, Utc};
use frontdesk_core::{Conversation, ConversationId, ConversationStatus, CustomerId, FrontdeskError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::rows::{CONVERSATION_COLUMNS, conversation_from_row, ts};

/// Latest non-archived conversation for the customer on `channel`, or a new
/// `auto` one.
pub async fn find_or_create(
    db: &Database,
    customer_id: &CustomerId,
    channel: &str,
    now: DateTime<Utc>,
) -> Result<Conversation, FrontdeskError> {
    let customer_id = customer_id.clone();
    let channel = channel.to_string();
    db.connection()
        .call(move |conn| -> Result<Conversation, rusqlite::Error> {
            let tx = conn.transaction()?;
            let existing = tx
                .query_row(
                    &format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE customer_id = ?1 AND channel = ?2 AND status != 'archived'
                         ORDER BY updated_at DESC, rowid DESC LIMIT 1"
                    ),
                    params![customer_id.0, channel],
                    conversation_from_row,
                )
                .optional()?;
            let conversation = match existing {
                Some(conversation) => conversation,
                None => {
                    let conversation = Conversation::new(customer_id, channel, now);
                    tx.execute(
                        "INSERT INTO conversations
                         (id, customer_id, channel, status, paused_from, assigned_to, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5, ?5)",
                        params![
                            conversation.id.0,
                            conversation.customer_id.0,
                            conversation.channel,
                            conversation.status.to_string(),
                            ts(&now),
                        ],
                    )?;
                    conversation
                }
            };
            tx.commit()?;
            Ok(conversation)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(
    db: &Database,
    id: &ConversationId,
) -> Result<Option<Conversation>, FrontdeskError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                params![id],
                conversation_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Conversations, most recently updated first, optionally filtered by status.
pub async fn list(
    db: &Database,
    status: Option<ConversationStatus>,
) -> Result<Vec<Conversation>, FrontdeskError> {
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| -> Result<Vec<Conversation>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations
                 WHERE (?1 IS NULL OR status = ?1)
                 ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![status], conversation_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Write back the mutable fields of a conversation whose stored status is
/// still `expected`.
pub async fn update(
    db: &Database,
    conversation: &Conversation,
    expected: ConversationStatus,
) -> Result<(), FrontdeskError> {
    let id = conversation.id.0.clone();
    let status = conversation.status.to_string();
    let paused_from = conversation.paused_from.map(|s| s.to_string());
    let assigned_to = conversation.assigned_to.clone();
    let updated_at = ts(&conversation.updated_at);
    let expected_status = expected.to_string();
    let key = id.clone();
    let (updated, exists) = db
        .connection()
        .call(move |conn| -> Result<(usize, bool), rusqlite::Error> {
            let updated = conn.execute(
                "UPDATE conversations
                 SET status = ?2, paused_from = ?3, assigned_to = ?4, updated_at = ?5
                 WHERE id = ?1 AND status = ?6",
                params![key, status, paused_from, assigned_to, updated_at, expected_status],
            )?;
            if updated > 0 {
                return Ok((updated, true));
            }
            let exists = conn
                .query_row(
                    "SELECT 1 FROM conversations WHERE id = ?1",
                    params![key],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            Ok((updated, exists))
        })
        .await
        .map_err(map_tr_err)?;
    match (updated, exists) {
        (0, false) => Err(FrontdeskError::NotFound {
            entity: "conversation",
            id,
        }),
        (0, true) => Err(FrontdeskError::StatusConflict { id, expected }),
        _ => Ok(()),
    }
}
