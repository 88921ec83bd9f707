// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. Each function takes `&Database` and runs through
//! the single connection thread.

pub mod alerts;
pub mod conversations;
pub mod customers;
pub mod messages;
