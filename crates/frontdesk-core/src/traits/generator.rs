// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response generator trait (the AI call that writes reply text).

use async_trait::async_trait;

use crate::error::FrontdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GeneratedResponse, GenerationRequest};

/// Turns a customer message plus conversation context into reply text.
///
/// Called only after the mode decision is "respond". A failure must be
/// returned as [`FrontdeskError::Generator`]; the pipeline does not retry.
#[async_trait]
pub trait ResponseGenerator: PluginAdapter {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedResponse, FrontdeskError>;
}
