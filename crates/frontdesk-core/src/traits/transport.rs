// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound transport trait (SMS gateway, webchat push, messenger API).

use async_trait::async_trait;

use crate::error::FrontdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::DeliveryReceipt;

/// Delivers one text segment to a recipient on a channel.
///
/// Retry policy belongs to the transport. The pipeline calls `send` once per
/// segment and surfaces failures instead of retrying.
#[async_trait]
pub trait TransportSender: PluginAdapter {
    async fn send(
        &self,
        channel: &str,
        to: &str,
        text: &str,
    ) -> Result<DeliveryReceipt, FrontdeskError>;
}
