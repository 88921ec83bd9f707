// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; with no recorder installed every call is a
//! no-op.

use metrics::describe_counter;

/// Register all frontdesk metric descriptions.
pub fn register_metrics() {
    describe_counter!("frontdesk_inbound_total", "Inbound customer messages received");
    describe_counter!(
        "frontdesk_dropped_total",
        "Inbound messages dropped as automated"
    );
    describe_counter!(
        "frontdesk_decisions_total",
        "Mode decisions taken for released batches"
    );
    describe_counter!(
        "frontdesk_escalations_total",
        "Staff escalations attempted, by alert type and outcome"
    );
    describe_counter!(
        "frontdesk_rate_limited_total",
        "Triggers rejected by the rate limiter"
    );
    describe_counter!(
        "frontdesk_transitions_total",
        "Conversation status transitions"
    );
}

pub fn record_inbound(channel: &str) {
    metrics::counter!("frontdesk_inbound_total", "channel" => channel.to_string()).increment(1);
}

pub fn record_dropped(category: &str) {
    metrics::counter!("frontdesk_dropped_total", "category" => category.to_string()).increment(1);
}

pub fn record_decision(decision: &'static str) {
    metrics::counter!("frontdesk_decisions_total", "decision" => decision).increment(1);
}

pub fn record_escalation(alert_type: &str, outcome: &'static str) {
    metrics::counter!(
        "frontdesk_escalations_total",
        "alert_type" => alert_type.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_rate_limited(endpoint: &str) {
    metrics::counter!("frontdesk_rate_limited_total", "endpoint" => endpoint.to_string())
        .increment(1);
}

pub fn record_transition(from: &str, to: &str) {
    metrics::counter!(
        "frontdesk_transitions_total",
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}
