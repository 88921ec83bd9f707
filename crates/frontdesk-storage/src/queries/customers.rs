// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer queries.

use chrono::{DateTime, Utc};
use frontdesk_core::{Customer, CustomerId, FrontdeskError, PhoneNumber};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::rows::{CUSTOMER_COLUMNS, customer_from_row, ts};

/// Return the customer for `phone`, inserting one if none exists. The
/// insert and read share a transaction, and `phone` is UNIQUE, so two
/// racing callers always get the same row.
pub async fn find_or_create(
    db: &Database,
    phone: &PhoneNumber,
    now: DateTime<Utc>,
) -> Result<Customer, FrontdeskError> {
    let phone = phone.as_str().to_string();
    let id = CustomerId::generate().0;
    let created_at = ts(&now);
    db.connection()
        .call(move |conn| -> Result<Customer, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO customers (id, phone, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(phone) DO NOTHING",
                params![id, phone, created_at],
            )?;
            let customer = tx.query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1"),
                params![phone],
                customer_from_row,
            )?;
            tx.commit()?;
            Ok(customer)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get(db: &Database, id: &CustomerId) -> Result<Option<Customer>, FrontdeskError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Customer>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"),
                params![id],
                customer_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Set name and/or email. `None` keeps the stored value.
pub async fn update_contact(
    db: &Database,
    id: &CustomerId,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<(), FrontdeskError> {
    let key = id.0.clone();
    let name = name.map(str::to_string);
    let email = email.map(str::to_string);
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE customers SET name = COALESCE(?2, name), email = COALESCE(?3, email)
                 WHERE id = ?1",
                params![key, name, email],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if updated == 0 {
        return Err(FrontdeskError::NotFound {
            entity: "customer",
            id: id.0.clone(),
        });
    }
    Ok(())
}
