// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row <-> domain conversions shared by the query modules.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use frontdesk_core::{
    Alert, Conversation, ConversationId, Customer, CustomerId, Message, MessageId, PhoneNumber,
};
use rusqlite::Row;
use rusqlite::types::Type;

pub(crate) const CUSTOMER_COLUMNS: &str = "id, phone, name, email, created_at";

pub(crate) const CONVERSATION_COLUMNS: &str =
    "id, customer_id, channel, status, paused_from, assigned_to, created_at, updated_at";

pub(crate) const MESSAGE_COLUMNS: &str = "id, conversation_id, sender, text, created_at, \
     ai_confidence, delivery_status, delivery_provider";

pub(crate) const ALERT_COLUMNS: &str = "id, conversation_id, alert_type, notified_to, created_at";

/// Fixed-width RFC 3339 so text order matches time order.
pub(crate) fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(idx, &raw)
}

fn get_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    T::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_opt_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|r| T::from_str(&r).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    let phone: String = row.get(1)?;
    let phone = PhoneNumber::parse(&phone)
        .ok_or_else(|| conversion_error(1, format!("stored phone `{phone}` is not canonical")))?;
    Ok(Customer {
        id: CustomerId(row.get(0)?),
        phone,
        name: row.get(2)?,
        email: row.get(3)?,
        created_at: get_ts(row, 4)?,
    })
}

pub(crate) fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        customer_id: CustomerId(row.get(1)?),
        channel: row.get(2)?,
        status: get_enum(row, 3)?,
        paused_from: get_opt_enum(row, 4)?,
        assigned_to: row.get(5)?,
        created_at: get_ts(row, 6)?,
        updated_at: get_ts(row, 7)?,
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: MessageId(row.get(0)?),
        conversation_id: ConversationId(row.get(1)?),
        sender: get_enum(row, 2)?,
        text: row.get(3)?,
        created_at: get_ts(row, 4)?,
        ai_confidence: row.get(5)?,
        delivery_status: row.get(6)?,
        delivery_provider: row.get(7)?,
    })
}

pub(crate) fn alert_from_row(row: &Row<'_>) -> rusqlite::Result<Alert> {
    Ok(Alert {
        id: row.get(0)?,
        conversation_id: ConversationId(row.get(1)?),
        alert_type: get_enum(row, 2)?,
        notified_to: row.get(3)?,
        created_at: get_ts(row, 4)?,
    })
}

/// SQLite LIMIT takes an i64.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
