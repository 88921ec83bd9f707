// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic background maintenance.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::mode::ModeController;
use crate::pipeline::InboundPipeline;

/// Return lapsed manual conversations to auto every `interval` until
/// `cancel` fires.
pub fn spawn_stale_manual_sweep(
    modes: Arc<ModeController>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match modes.reset_stale_manual(Utc::now()).await {
                        Ok(0) => debug!("stale manual sweep found nothing"),
                        Ok(reset) => info!(reset, "stale manual conversations returned to auto"),
                        Err(e) => warn!(error = %e, "stale manual sweep failed"),
                    }
                }
            }
        }
    })
}

/// Start the mode sweep and the rate-limiter sweeper for a pipeline.
pub fn spawn_maintenance(
    pipeline: &InboundPipeline,
    mode_interval: Duration,
    rate_limit_interval: Duration,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_stale_manual_sweep(Arc::clone(pipeline.modes()), mode_interval, cancel.clone()),
        pipeline
            .rate_limiter()
            .spawn_sweeper(rate_limit_interval, cancel),
    ]
}
