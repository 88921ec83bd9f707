// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact detail extraction.
//!
//! Pulls a name, a UK mobile number and an email address out of customer
//! messages, and a customer's name out of staff replies ("Thanks Sarah").
//! Used to backfill customer records that were created from a bare phone
//! number.

pub mod contact;
pub mod name;

pub use contact::{ContactInfo, SAVE_NAME_CONFIDENCE, extract_contact};
pub use name::{NameSource, extract_customer_name, extract_name_from_signature, find_customer_name};
