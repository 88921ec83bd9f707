// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert queries.

use frontdesk_core::{Alert, ConversationId, FrontdeskError};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::rows::{ALERT_COLUMNS, alert_from_row, sql_limit, ts};

pub async fn insert(db: &Database, alert: &Alert) -> Result<(), FrontdeskError> {
    let alert = alert.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                &format!("INSERT INTO alerts ({ALERT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                params![
                    alert.id,
                    alert.conversation_id.0,
                    alert.alert_type.to_string(),
                    alert.notified_to,
                    ts(&alert.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Newest alert of any type for a conversation.
pub async fn last(
    db: &Database,
    conversation_id: &ConversationId,
) -> Result<Option<Alert>, FrontdeskError> {
    let conversation_id = conversation_id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Alert>, rusqlite::Error> {
            conn.query_row(
                &format!(
                    "SELECT {ALERT_COLUMNS} FROM alerts WHERE conversation_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                params![conversation_id],
                alert_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Newest alerts across all conversations.
pub async fn list(db: &Database, limit: usize) -> Result<Vec<Alert>, FrontdeskError> {
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| -> Result<Vec<Alert>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ALERT_COLUMNS} FROM alerts ORDER BY created_at DESC, rowid DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit], alert_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}
