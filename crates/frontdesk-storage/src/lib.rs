// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for frontdesk.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed queries for customers,
//! conversations, messages and alerts.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;
mod rows;

pub use adapter::SqliteStore;
pub use database::Database;
