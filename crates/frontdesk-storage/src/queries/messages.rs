// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message queries.

use chrono::{DateTime, Utc};
use frontdesk_core::{ConversationId, FrontdeskError, Message, MessageId, Sender};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::rows::{MESSAGE_COLUMNS, message_from_row, parse_ts, sql_limit, ts};

pub async fn insert(db: &Database, message: &Message) -> Result<(), FrontdeskError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!(
                    "INSERT INTO messages ({MESSAGE_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    message.id.0,
                    message.conversation_id.0,
                    message.sender.to_string(),
                    message.text,
                    ts(&message.created_at),
                    message.ai_confidence,
                    message.delivery_status,
                    message.delivery_provider,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &MessageId) -> Result<Option<Message>, FrontdeskError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Message>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                message_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn update_sender(
    db: &Database,
    id: &MessageId,
    sender: Sender,
) -> Result<(), FrontdeskError> {
    let key = id.0.clone();
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE messages SET sender = ?2 WHERE id = ?1",
                params![key, sender.to_string()],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if updated == 0 {
        return Err(FrontdeskError::NotFound {
            entity: "message",
            id: id.0.clone(),
        });
    }
    Ok(())
}

/// The latest `limit` messages of a conversation, oldest first.
pub async fn recent(
    db: &Database,
    conversation_id: &ConversationId,
    limit: usize,
) -> Result<Vec<Message>, FrontdeskError> {
    let conversation_id = conversation_id.0.clone();
    let limit = sql_limit(limit);
    let mut messages = db
        .connection()
        .call(move |conn| -> Result<Vec<Message>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![conversation_id, limit], message_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;
    messages.reverse();
    Ok(messages)
}

/// Timestamp of the newest message from `sender`, if any.
pub async fn last_at(
    db: &Database,
    conversation_id: &ConversationId,
    sender: Sender,
) -> Result<Option<DateTime<Utc>>, FrontdeskError> {
    let conversation_id = conversation_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
            let raw: Option<String> = conn.query_row(
                "SELECT MAX(created_at) FROM messages WHERE conversation_id = ?1 AND sender = ?2",
                params![conversation_id, sender.to_string()],
                |row| row.get(0),
            )?;
            raw.map(|r| parse_ts(0, &r)).transpose()
        })
        .await
        .map_err(map_tr_err)
}
