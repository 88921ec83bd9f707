// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `frontdesk serve` command implementation.
//!
//! Opens the SQLite store, wires the inbound pipeline to the JSON-lines
//! transport and template generator, then reads one JSON event per line from
//! stdin. Each event runs on its own task so a message waiting out its batch
//! window never blocks the next one. Outcomes are written to stdout as JSON
//! lines. SIGINT/SIGTERM (or end of input) stop the reader; in-flight events
//! are drained before the store is closed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWrite, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use frontdesk_agent::{install_signal_handler, recording, sweep, InboundPipeline};
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{
    ConversationId, ConversationStore, FrontdeskError, InboundMessage, MessageId,
    ResponseGenerator, TransportSender,
};
use frontdesk_storage::SqliteStore;

use crate::adapters::{JsonLines, JsonLinesTransport, TemplateGenerator};

/// Install the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("frontdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_channel() -> String {
    "sms".to_string()
}

/// One line of serve input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Inbound {
        #[serde(default = "default_channel")]
        channel: String,
        from: String,
        text: String,
        #[serde(default)]
        received_at: Option<DateTime<Utc>>,
    },
    MissedCall {
        #[serde(default = "default_channel")]
        channel: String,
        from: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    StaffReply {
        conversation_id: ConversationId,
        text: String,
        #[serde(default)]
        sent_at: Option<DateTime<Utc>>,
    },
    /// Outbound text from the shared number, author unknown.
    Echo {
        #[serde(default = "default_channel")]
        channel: String,
        to: String,
        text: String,
        #[serde(default)]
        sent_at: Option<DateTime<Utc>>,
    },
    CorrectSender {
        message_id: MessageId,
    },
    /// Operator asks for staff attention on a conversation.
    Escalate {
        conversation_id: ConversationId,
        #[serde(default)]
        urgent: bool,
        #[serde(default)]
        note: Option<String>,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inbound { .. } => "inbound",
            Self::MissedCall { .. } => "missed_call",
            Self::StaffReply { .. } => "staff_reply",
            Self::Echo { .. } => "echo",
            Self::CorrectSender { .. } => "correct_sender",
            Self::Escalate { .. } => "escalate",
        }
    }
}

/// One line of serve output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Outcome {
        event: &'static str,
        result: serde_json::Value,
    },
    Error {
        event: &'static str,
        error: String,
    },
}

fn outcome<T: Serialize>(event: &'static str, result: Result<T, FrontdeskError>) -> Record {
    match result.and_then(|value| {
        serde_json::to_value(value)
            .map_err(|e| FrontdeskError::Internal(format!("failed to encode outcome: {e}")))
    }) {
        Ok(result) => Record::Outcome { event, result },
        Err(e) => {
            warn!(event, error = %e, "event failed");
            Record::Error {
                event,
                error: e.to_string(),
            }
        }
    }
}

/// Run one event through the pipeline.
pub async fn dispatch(pipeline: &InboundPipeline, event: Event) -> Record {
    let name = event.name();
    match event {
        Event::Inbound {
            channel,
            from,
            text,
            received_at,
        } => {
            let inbound = InboundMessage {
                channel,
                from,
                text,
                received_at: received_at.unwrap_or_else(Utc::now),
            };
            outcome(name, pipeline.handle_inbound(inbound).await)
        }
        Event::MissedCall { channel, from, at } => outcome(
            name,
            pipeline
                .handle_missed_call(&channel, &from, at.unwrap_or_else(Utc::now))
                .await,
        ),
        Event::StaffReply {
            conversation_id,
            text,
            sent_at,
        } => outcome(
            name,
            pipeline
                .record_staff_message(&conversation_id, &text, sent_at.unwrap_or_else(Utc::now))
                .await,
        ),
        Event::Echo {
            channel,
            to,
            text,
            sent_at,
        } => outcome(
            name,
            pipeline
                .record_outbound_echo(&channel, &to, &text, sent_at.unwrap_or_else(Utc::now))
                .await,
        ),
        Event::CorrectSender { message_id } => {
            outcome(name, pipeline.correct_message_sender(&message_id).await)
        }
        Event::Escalate {
            conversation_id,
            urgent,
            note,
            at,
        } => outcome(
            name,
            pipeline
                .request_staff(
                    &conversation_id,
                    urgent,
                    note.as_deref(),
                    at.unwrap_or_else(Utc::now),
                )
                .await,
        ),
    }
}

/// Runs the `frontdesk serve` command.
pub async fn run_serve(config: FrontdeskConfig) -> Result<(), FrontdeskError> {
    init_tracing(&config.agent.log_level);
    recording::register_metrics();

    info!(agent = %config.agent.name, "starting frontdesk serve");

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let out = JsonLines::stdout();
    let pipeline = Arc::new(InboundPipeline::new(
        &config,
        Arc::clone(&store) as Arc<dyn ConversationStore>,
        Arc::new(TemplateGenerator::new(&config.business)) as Arc<dyn ResponseGenerator>,
        Arc::new(JsonLinesTransport::new(out.clone())) as Arc<dyn TransportSender>,
    ));

    let cancel = install_signal_handler();
    let maintenance = sweep::spawn_maintenance(
        &pipeline,
        Duration::from_secs(config.mode.sweep_interval_secs),
        Duration::from_secs(config.rate_limit.sweep_interval_secs),
        cancel.clone(),
    );

    let in_flight = read_events(
        BufReader::new(tokio::io::stdin()),
        Arc::clone(&pipeline),
        out,
        cancel.clone(),
    )
    .await;
    drain(in_flight).await;

    cancel.cancel();
    for handle in maintenance {
        if let Err(e) = handle.await {
            warn!(error = %e, "background task ended abnormally");
        }
    }

    store.close().await?;
    info!("frontdesk serve stopped");
    Ok(())
}

/// Spawn a task per input line until end of input or cancellation.
async fn read_events<R, W>(
    input: R,
    pipeline: Arc<InboundPipeline>,
    out: JsonLines<W>,
    cancel: tokio_util::sync::CancellationToken,
) -> JoinSet<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut lines = input.lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                info!("shutdown requested, no longer reading events");
                break;
            }
            line = lines.next_line() => line,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("input closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "failed to read input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "ignoring malformed event");
                let record = Record::Error {
                    event: "unknown",
                    error: format!("malformed event: {e}"),
                };
                if let Err(e) = out.emit(&record).await {
                    warn!(error = %e, "failed to write record");
                }
                continue;
            }
        };
        debug!(event = event.name(), "event received");
        let pipeline = Arc::clone(&pipeline);
        let out = out.clone();
        tasks.spawn(async move {
            let record = dispatch(&pipeline, event).await;
            if let Err(e) = out.emit(&record).await {
                warn!(error = %e, "failed to write record");
            }
        });
    }
    tasks
}

async fn drain(mut tasks: JoinSet<()>) {
    if !tasks.is_empty() {
        info!(pending = tasks.len(), "waiting for in-flight events");
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "event task ended abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use frontdesk_test_utils::PipelineHarness;
    use tokio_util::sync::CancellationToken;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn events_parse_with_defaults() {
        let event: Event =
            serde_json::from_str(r#"{"event":"inbound","from":"07700 900123","text":"hi"}"#)
                .unwrap();
        assert_eq!(
            event,
            Event::Inbound {
                channel: "sms".to_string(),
                from: "07700 900123".to_string(),
                text: "hi".to_string(),
                received_at: None,
            }
        );

        let event: Event = serde_json::from_str(
            r#"{"event":"missed_call","channel":"voice","from":"+447700900123","at":"2026-03-14T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(event.name(), "missed_call");
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<Event>(r#"{"event":"fax","from":"x"}"#).is_err());
    }

    #[tokio::test]
    async fn inbound_event_reports_the_decision() {
        let harness = PipelineHarness::new();
        let record = dispatch(
            &harness.pipeline,
            Event::Inbound {
                channel: "sms".to_string(),
                from: "07700 900123".to_string(),
                text: "can you check on my laptop for me".to_string(),
                received_at: Some(t0()),
            },
        )
        .await;
        let Record::Outcome { event, result } = record else {
            panic!("expected an outcome");
        };
        assert_eq!(event, "inbound");
        assert_eq!(result["outcome"], "responded");
        assert_eq!(result["segments"], 1);
    }

    #[tokio::test]
    async fn urgent_escalation_event_raises_high_priority_alert() {
        let harness = PipelineHarness::new();
        let (_, conversation) = harness.conversation_for("07700 900123", t0()).await;
        let event: Event = serde_json::from_str(&format!(
            r#"{{"event":"escalate","conversation_id":"{}","urgent":true,"note":"customer on the phone, angry","at":"2026-03-14T09:00:00Z"}}"#,
            conversation.id
        ))
        .unwrap();
        assert_eq!(event.name(), "escalate");

        let Record::Outcome { result, .. } = dispatch(&harness.pipeline, event).await else {
            panic!("expected an outcome");
        };
        assert_eq!(result["outcome"], "sent");
        assert_eq!(result["alert_type"], "high_priority");
    }

    #[tokio::test]
    async fn pipeline_errors_become_error_records() {
        let harness = PipelineHarness::new();
        let record = dispatch(
            &harness.pipeline,
            Event::StaffReply {
                conversation_id: ConversationId("missing".to_string()),
                text: "hello".to_string(),
                sent_at: Some(t0()),
            },
        )
        .await;
        let Record::Error { event, error } = record else {
            panic!("expected an error record");
        };
        assert_eq!(event, "staff_reply");
        assert!(error.contains("missing"));
    }

    #[tokio::test]
    async fn reader_runs_every_line_and_reports_bad_input() {
        let harness = PipelineHarness::new();
        let input = concat!(
            r#"{"event":"inbound","from":"07700 900123","text":"is my laptop ready yet","received_at":"2026-03-14T09:00:00Z"}"#,
            "\n\nnot json\n",
            r#"{"event":"inbound","from":"ROYALMAIL","text":"Your parcel is on its way","received_at":"2026-03-14T09:01:00Z"}"#,
            "\n",
        );
        let out = JsonLines::new(Vec::<u8>::new());
        let tasks = read_events(
            BufReader::new(input.as_bytes()),
            Arc::clone(&harness.pipeline),
            out.clone(),
            CancellationToken::new(),
        )
        .await;
        drain(tasks).await;

        let written = String::from_utf8(out.contents().await).unwrap();
        let records: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().filter(|r| r["type"] == "error").count(),
            1,
            "only the malformed line fails"
        );
        let outcomes: Vec<&str> = records
            .iter()
            .filter_map(|r| r["result"]["outcome"].as_str())
            .collect();
        assert!(outcomes.contains(&"responded"));
        assert!(outcomes.contains(&"dropped"));
    }

    #[tokio::test]
    async fn reader_stops_when_cancelled() {
        let harness = PipelineHarness::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (_writer, reader) = tokio::io::duplex(64);
        let tasks = read_events(
            BufReader::new(reader),
            Arc::clone(&harness.pipeline),
            JsonLines::new(Vec::<u8>::new()),
            cancel,
        )
        .await;
        assert!(tasks.is_empty());
    }
}
