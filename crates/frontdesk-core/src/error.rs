// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the frontdesk pipeline.
//!
//! Classification and extraction never fail; they always produce a typed
//! result. Errors are reserved for configuration problems, collaborator
//! failures (store, transport, generator) and rejected state transitions.

use thiserror::Error;

use crate::types::ConversationStatus;

/// The primary error type used across all frontdesk crates.
#[derive(Debug, Error)]
pub enum FrontdeskError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistent store errors (connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound transport failed to deliver a message.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The response generator failed to produce a reply.
    #[error("generator error: {message}")]
    Generator {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A conversation status change that the state machine does not allow.
    #[error("invalid conversation transition from {from} to {to}")]
    InvalidTransition {
        from: ConversationStatus,
        to: ConversationStatus,
    },

    /// The stored conversation left `expected` after it was read.
    #[error("conversation {id} is no longer {expected}")]
    StatusConflict {
        id: String,
        expected: ConversationStatus,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FrontdeskError {
    /// Wrap any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        FrontdeskError::Storage {
            source: Box::new(err),
        }
    }

    /// Whether this error came from an external collaborator rather than
    /// from the pipeline itself.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            FrontdeskError::Storage { .. }
                | FrontdeskError::Transport { .. }
                | FrontdeskError::Generator { .. }
                | FrontdeskError::Timeout { .. }
        )
    }
}
