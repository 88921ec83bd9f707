// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The inbound message pipeline.
//!
//! One customer text flows through: classification (automated senders are
//! dropped before anything is written), phone normalization, persistence,
//! debounced batching, the mode decision, then either a hold (with an
//! optional staff alert) or a generated reply sent segment by segment.
//! Generator and transport failures are returned to the caller, never
//! swallowed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use frontdesk_classify::{
    holiday, AutomatedCategory, ChainOutcome, ClassifierChain, HolidayStatus, Label,
    SenderDetector,
};
use frontdesk_config::model::MissedCallConfig;
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{
    AlertType, Conversation, ConversationId, ConversationStatus, ConversationStore, Customer,
    FrontdeskError, GeneratedResponse, GenerationRequest, InboundMessage, Message, MessageId,
    PhoneNormalizer, PhoneNumber, ResponseGenerator, ResponseScope, Sender, TransportSender,
};
use frontdesk_extract::{extract_contact, extract_name_from_signature};
use frontdesk_throttle::{BatchKey, BatchOutcome, MessageBatcher, RateLimitDecision, RateLimiter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::escalation::{EscalationDispatcher, EscalationRequest, NotifyOutcome};
use crate::mode::{self, HoldReason, ModeController, ModeDecision, Transition};
use crate::recording;

/// Rate-limit endpoint name for missed-call texts.
pub const MISSED_CALL_ENDPOINT: &str = "missed_call";

/// Messages of history handed to the generator.
const HISTORY_LIMIT: usize = 20;

/// Tunables lifted out of [`FrontdeskConfig`].
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub cooldown_minutes: i64,
    pub confidence_threshold: u8,
    pub history_limit: usize,
    pub missed_call: MissedCallConfig,
    pub missed_call_window: Duration,
    pub missed_call_max: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &FrontdeskConfig) -> Self {
        Self {
            cooldown_minutes: config.mode.staff_cooldown_minutes,
            confidence_threshold: config.escalation.confidence_threshold,
            history_limit: HISTORY_LIMIT,
            missed_call: config.missed_call.clone(),
            missed_call_window: Duration::from_secs(config.rate_limit.missed_call_window_secs),
            missed_call_max: config.rate_limit.missed_call_max,
        }
    }
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InboundOutcome {
    /// The sender address did not normalize to a phone number.
    Rejected { reason: String },
    /// Automated or bulk sender; nothing was stored.
    Dropped {
        category: AutomatedCategory,
        reason: String,
    },
    /// A later message from the same customer took over this batch.
    Superseded { conversation_id: ConversationId },
    Held {
        conversation_id: ConversationId,
        reason: HoldReason,
        cooldown_remaining_minutes: Option<i64>,
        escalation: Option<NotifyOutcome>,
    },
    Responded {
        conversation_id: ConversationId,
        scope: ResponseScope,
        segments: usize,
        confidence: u8,
        escalation: Option<NotifyOutcome>,
    },
}

/// Result of recording a staff reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffReply {
    pub message_id: MessageId,
    pub transition: Option<Transition>,
}

/// Result of recording an outbound message echoed back by the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoOutcome {
    pub conversation_id: ConversationId,
    pub message_id: MessageId,
    pub sender: Sender,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MissedCallOutcome {
    Disabled,
    Rejected { reason: String },
    RateLimited { retry_after_secs: u64 },
    /// The missed-call text went out.
    Replied { conversation_id: ConversationId },
    /// Staff own the conversation, so they were alerted instead.
    Escalated {
        conversation_id: ConversationId,
        escalation: Option<NotifyOutcome>,
    },
}

/// Wires classification, storage, batching, mode control, generation and
/// delivery together.
pub struct InboundPipeline {
    store: Arc<dyn ConversationStore>,
    generator: Arc<dyn ResponseGenerator>,
    transport: Arc<dyn TransportSender>,
    chain: ClassifierChain,
    normalizer: PhoneNormalizer,
    senders: SenderDetector,
    signature_exclusions: Vec<String>,
    batcher: Arc<MessageBatcher>,
    limiter: Arc<RateLimiter>,
    modes: Arc<ModeController>,
    escalation: EscalationDispatcher,
    closure: HolidayStatus,
    settings: PipelineSettings,
}

impl InboundPipeline {
    pub fn new(
        config: &FrontdeskConfig,
        store: Arc<dyn ConversationStore>,
        generator: Arc<dyn ResponseGenerator>,
        transport: Arc<dyn TransportSender>,
    ) -> Self {
        let normalizer = PhoneNormalizer::new(config.identity.default_country_code.clone());
        let batcher = Arc::new(MessageBatcher::new(
            Duration::from_millis(config.batching.window_ms),
            config.batching.enabled,
        ));
        let modes = Arc::new(ModeController::new(
            Arc::clone(&store),
            Arc::clone(&batcher),
            config.mode.staff_cooldown_minutes,
        ));
        let escalation = EscalationDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&transport),
            &config.business,
            &config.escalation,
            normalizer.clone(),
        );
        let mut signature_exclusions = config.business.staff_names.clone();
        signature_exclusions.push(config.business.persona_signature.clone());

        Self {
            senders: SenderDetector::new(
                &config.business.persona_signature,
                &config.business.staff_names,
            ),
            closure: config
                .business
                .special_notice
                .as_deref()
                .map(holiday::detect)
                .unwrap_or_default(),
            settings: PipelineSettings::from_config(config),
            chain: ClassifierChain::standard(),
            limiter: Arc::new(RateLimiter::new()),
            store,
            generator,
            transport,
            normalizer,
            signature_exclusions,
            batcher,
            modes,
            escalation,
        }
    }

    pub fn modes(&self) -> &Arc<ModeController> {
        &self.modes
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn batcher(&self) -> &Arc<MessageBatcher> {
        &self.batcher
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one inbound customer text end to end.
    pub async fn handle_inbound(
        &self,
        inbound: InboundMessage,
    ) -> Result<InboundOutcome, FrontdeskError> {
        recording::record_inbound(&inbound.channel);

        let first_pass = self.chain.run(&inbound.text, &inbound.from);
        if let Some((category, reason)) = automated_verdict(&first_pass) {
            recording::record_dropped(&category.to_string());
            info!(
                channel = %inbound.channel,
                from = %inbound.from,
                %reason,
                "dropping automated message"
            );
            return Ok(InboundOutcome::Dropped { category, reason });
        }

        let Some(phone) = self.normalizer.parse(&inbound.from) else {
            warn!(from = %inbound.from, "rejecting inbound message with unusable sender");
            return Ok(InboundOutcome::Rejected {
                reason: format!("`{}` is not a phone number", inbound.from),
            });
        };

        let received_at = inbound.received_at;
        let customer = self.store.find_or_create_customer(&phone, received_at).await?;
        let conversation = self
            .store
            .find_or_create_conversation(&customer.id, &inbound.channel, received_at)
            .await?;
        self.store
            .insert_message(&Message::new(
                conversation.id.clone(),
                Sender::Customer,
                inbound.text.clone(),
                received_at,
            ))
            .await?;
        self.backfill_contact(&customer, &inbound.text).await;

        if let Some(reason) = frozen_reason(conversation.status) {
            recording::record_decision("hold");
            debug!(conversation_id = %conversation.id, %reason, "conversation frozen");
            return Ok(InboundOutcome::Held {
                conversation_id: conversation.id,
                reason,
                cooldown_remaining_minutes: None,
                escalation: None,
            });
        }

        let key = BatchKey::new(customer.id.clone(), conversation.id.clone());
        let batch = match self.batcher.batch(key, inbound.clone()).await {
            BatchOutcome::Ready(batch) => batch,
            BatchOutcome::Superseded => {
                debug!(conversation_id = %conversation.id, "message superseded by a later one");
                return Ok(InboundOutcome::Superseded {
                    conversation_id: conversation.id,
                });
            }
        };

        let text = batch.combined_text();
        let now = batch
            .messages
            .last()
            .map_or(received_at, |m| m.received_at);
        let chain = if batch.should_batch {
            self.chain.run(&text, &inbound.from)
        } else {
            first_pass
        };

        let customer = self
            .store
            .get_customer(&customer.id)
            .await?
            .unwrap_or(customer);

        // Staff may have replied or paused while the batch was pending, or
        // while the decision was being made. A transition that lost the race
        // is decided again once against the fresh status.
        let mut retried = false;
        let (conversation, decision) = loop {
            let mut current = self
                .store
                .get_conversation(&conversation.id)
                .await?
                .ok_or_else(|| FrontdeskError::NotFound {
                    entity: "conversation",
                    id: conversation.id.to_string(),
                })?;
            let decision = self.decide(&current, &chain, now).await?;
            if let Some(transition) = decision.transition() {
                match self
                    .modes
                    .apply(&mut current, transition.to, transition.cause, now)
                    .await
                {
                    Err(FrontdeskError::StatusConflict { .. }) if !retried => {
                        debug!(conversation_id = %current.id, "status changed underneath, deciding again");
                        retried = true;
                        continue;
                    }
                    result => {
                        result?;
                    }
                }
            }
            break (current, decision);
        };
        recording::record_decision(decision.label());

        match decision {
            ModeDecision::Hold {
                reason,
                cooldown_remaining_minutes,
                escalate,
                ..
            } => {
                let escalation = if escalate {
                    self.escalate(&conversation, &customer, AlertType::ManualRequired, &text, now)
                        .await
                } else {
                    None
                };
                info!(
                    conversation_id = %conversation.id,
                    %reason,
                    ?cooldown_remaining_minutes,
                    "holding reply for staff"
                );
                Ok(InboundOutcome::Held {
                    conversation_id: conversation.id,
                    reason,
                    cooldown_remaining_minutes,
                    escalation,
                })
            }
            ModeDecision::Respond { scope, .. } => {
                self.respond(&conversation, &customer, &phone, text, scope, now)
                    .await
            }
        }
    }

    async fn decide(
        &self,
        conversation: &Conversation,
        chain: &ChainOutcome,
        now: DateTime<Utc>,
    ) -> Result<ModeDecision, FrontdeskError> {
        let minutes_since_staff = self
            .modes
            .staff_reference(conversation)
            .await?
            .map(|since| mode::minutes_between(since, now));
        Ok(mode::evaluate(
            conversation.status,
            chain,
            minutes_since_staff,
            self.settings.cooldown_minutes,
        ))
    }

    async fn respond(
        &self,
        conversation: &Conversation,
        customer: &Customer,
        phone: &PhoneNumber,
        text: String,
        scope: ResponseScope,
        now: DateTime<Utc>,
    ) -> Result<InboundOutcome, FrontdeskError> {
        let history = self
            .store
            .recent_messages(&conversation.id, self.settings.history_limit)
            .await?;
        let request = GenerationRequest {
            customer_message: text.clone(),
            conversation_id: conversation.id.clone(),
            customer_phone: phone.clone(),
            history,
            scope,
            closure: self.closure.closure_context(now.date_naive()),
        };

        let response = self.generator.generate(request).await.inspect_err(|e| {
            warn!(conversation_id = %conversation.id, error = %e, "reply generation failed");
        })?;

        let low_confidence = response.confidence < self.settings.confidence_threshold;
        let (delivered, escalation) = tokio::join!(
            self.deliver(conversation, phone, &response),
            async {
                if low_confidence {
                    self.escalate(conversation, customer, AlertType::LowConfidence, &text, now)
                        .await
                } else {
                    None
                }
            }
        );
        let segments = delivered?;

        info!(
            conversation_id = %conversation.id,
            segments,
            confidence = response.confidence,
            provider = %response.provider,
            "reply sent"
        );
        Ok(InboundOutcome::Responded {
            conversation_id: conversation.id.clone(),
            scope,
            segments,
            confidence: response.confidence,
            escalation,
        })
    }

    /// Send each reply segment in order and record it as an automated
    /// message. Stops at the first failed segment.
    async fn deliver(
        &self,
        conversation: &Conversation,
        phone: &PhoneNumber,
        response: &GeneratedResponse,
    ) -> Result<usize, FrontdeskError> {
        let segments: Vec<&str> = response
            .responses
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if segments.is_empty() {
            warn!(conversation_id = %conversation.id, "generator returned no reply text");
        }

        for (sent, segment) in segments.iter().enumerate() {
            let receipt = self
                .transport
                .send(&conversation.channel, phone.as_str(), segment)
                .await
                .inspect_err(|e| {
                    warn!(conversation_id = %conversation.id, error = %e, "reply delivery failed");
                })?;

            let mut message = Message::new(
                conversation.id.clone(),
                Sender::Ai,
                *segment,
                Utc::now(),
            );
            message.ai_confidence = Some(response.confidence);
            message.delivery_provider = Some(receipt.provider.clone());
            message.delivery_status = Some(if receipt.sent { "sent" } else { "failed" }.to_string());
            self.store.insert_message(&message).await?;

            if !receipt.sent {
                let error = receipt.error.unwrap_or_else(|| "not sent".to_string());
                warn!(
                    conversation_id = %conversation.id,
                    delivered = sent,
                    %error,
                    "reply delivery failed"
                );
                return Err(FrontdeskError::Transport {
                    message: error,
                    source: None,
                });
            }
        }
        Ok(segments.len())
    }

    async fn escalate(
        &self,
        conversation: &Conversation,
        customer: &Customer,
        alert_type: AlertType,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<NotifyOutcome> {
        let request = EscalationRequest {
            conversation_id: &conversation.id,
            alert_type,
            customer_phone: &customer.phone,
            customer_name: customer.name.as_deref(),
            last_message: Some(text),
        };
        match self.escalation.notify(request, now).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(
                    conversation_id = %conversation.id,
                    %alert_type,
                    error = %e,
                    "escalation failed"
                );
                None
            }
        }
    }

    /// Fill in a customer's missing name or email from their own text.
    async fn backfill_contact(&self, customer: &Customer, text: &str) {
        if customer.name.is_some() && customer.email.is_some() {
            return;
        }
        let info = extract_contact(text);
        let name = info
            .name_to_save()
            .filter(|_| customer.name.is_none())
            .map(str::to_string);
        let email = info.email.filter(|_| customer.email.is_none());
        self.update_contact(customer, name, email).await;
    }

    async fn update_contact(&self, customer: &Customer, name: Option<String>, email: Option<String>) {
        if name.is_none() && email.is_none() {
            return;
        }
        match self
            .store
            .update_customer_contact(&customer.id, name.as_deref(), email.as_deref())
            .await
        {
            Ok(()) => debug!(
                customer_id = %customer.id,
                name = name.is_some(),
                email = email.is_some(),
                "customer contact backfilled"
            ),
            Err(e) => warn!(customer_id = %customer.id, error = %e, "contact backfill failed"),
        }
    }

    /// Record a reply typed by staff. An auto conversation flips to manual
    /// and any pending batch for it is released.
    pub async fn record_staff_message(
        &self,
        conversation_id: &ConversationId,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<StaffReply, FrontdeskError> {
        let mut conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::NotFound {
                entity: "conversation",
                id: conversation_id.to_string(),
            })?;
        let message = Message::new(conversation.id.clone(), Sender::Staff, text, sent_at);
        self.store.insert_message(&message).await?;
        let transition = self
            .modes
            .record_staff_activity(&mut conversation, sent_at)
            .await?;
        self.learn_name_from_staff(&conversation, text).await?;
        Ok(StaffReply {
            message_id: message.id,
            transition,
        })
    }

    /// Alert staff about a conversation on an operator's request. `urgent`
    /// raises a high-priority alert, which repeats on the short cooldown.
    /// Without a `note` the alert quotes the customer's latest message.
    pub async fn request_staff(
        &self,
        conversation_id: &ConversationId,
        urgent: bool,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<NotifyOutcome, FrontdeskError> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| FrontdeskError::NotFound {
                entity: "conversation",
                id: conversation_id.to_string(),
            })?;
        let customer = self
            .store
            .get_customer(&conversation.customer_id)
            .await?
            .ok_or_else(|| FrontdeskError::NotFound {
                entity: "customer",
                id: conversation.customer_id.to_string(),
            })?;
        let latest = match note {
            Some(_) => None,
            None => self
                .store
                .recent_messages(&conversation.id, self.settings.history_limit)
                .await?
                .into_iter()
                .rev()
                .find(|m| m.sender == Sender::Customer)
                .map(|m| m.text),
        };
        let alert_type = if urgent {
            AlertType::HighPriority
        } else {
            AlertType::ManualRequired
        };
        let request = EscalationRequest {
            conversation_id: &conversation.id,
            alert_type,
            customer_phone: &customer.phone,
            customer_name: customer.name.as_deref(),
            last_message: note.or(latest.as_deref()),
        };
        self.escalation.notify(request, now).await
    }

    /// Record an outbound message from the shared business number that the
    /// transport echoed back. Its author is unknown, so the text decides:
    /// the automated persona's signature marks it as automated, anything
    /// else is treated as staff. Returns `None` for an unusable recipient.
    pub async fn record_outbound_echo(
        &self,
        channel: &str,
        to: &str,
        text: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Option<EchoOutcome>, FrontdeskError> {
        let Some(phone) = self.normalizer.parse(to) else {
            warn!(to = %to, "ignoring outbound echo with unusable recipient");
            return Ok(None);
        };
        let customer = self.store.find_or_create_customer(&phone, sent_at).await?;
        let mut conversation = self
            .store
            .find_or_create_conversation(&customer.id, channel, sent_at)
            .await?;

        let detection = self.senders.detect(text, Sender::Staff);
        let message = Message::new(conversation.id.clone(), detection.sender, text, sent_at);
        self.store.insert_message(&message).await?;
        debug!(
            conversation_id = %conversation.id,
            sender = %detection.sender,
            reason = %detection.reason,
            "outbound echo recorded"
        );

        let transition = if detection.sender == Sender::Staff {
            let transition = self
                .modes
                .record_staff_activity(&mut conversation, sent_at)
                .await?;
            self.learn_name_from_staff(&conversation, text).await?;
            transition
        } else {
            None
        };

        Ok(Some(EchoOutcome {
            conversation_id: conversation.id,
            message_id: message.id,
            sender: detection.sender,
            transition,
        }))
    }

    /// Re-run sender detection on a stored message and fix its sender.
    /// Returns the new sender when it changed.
    pub async fn correct_message_sender(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Sender>, FrontdeskError> {
        let message = self
            .store
            .get_message(message_id)
            .await?
            .ok_or_else(|| FrontdeskError::NotFound {
                entity: "message",
                id: message_id.to_string(),
            })?;
        let corrected = self.senders.correct_sender(&message.text, message.sender);
        if corrected == message.sender {
            return Ok(None);
        }
        self.store.update_message_sender(message_id, corrected).await?;
        info!(
            message_id = %message_id,
            from = %message.sender,
            to = %corrected,
            "message sender corrected"
        );
        Ok(Some(corrected))
    }

    /// Answer a missed call with the configured text, rate limited per
    /// caller. Conversations staff own get an alert instead.
    pub async fn handle_missed_call(
        &self,
        channel: &str,
        from: &str,
        at: DateTime<Utc>,
    ) -> Result<MissedCallOutcome, FrontdeskError> {
        if !self.settings.missed_call.enabled {
            return Ok(MissedCallOutcome::Disabled);
        }
        let Some(phone) = self.normalizer.parse(from) else {
            return Ok(MissedCallOutcome::Rejected {
                reason: format!("`{from}` is not a phone number"),
            });
        };

        if let RateLimitDecision::Rejected { retry_after_secs } = self.limiter.check(
            phone.as_str(),
            MISSED_CALL_ENDPOINT,
            self.settings.missed_call_window,
            self.settings.missed_call_max,
        ) {
            recording::record_rate_limited(MISSED_CALL_ENDPOINT);
            info!(caller = %phone, retry_after_secs, "missed-call text rate limited");
            return Ok(MissedCallOutcome::RateLimited { retry_after_secs });
        }

        let customer = self.store.find_or_create_customer(&phone, at).await?;
        let conversation = self
            .store
            .find_or_create_conversation(&customer.id, channel, at)
            .await?;

        if conversation.status != ConversationStatus::Auto {
            let escalation = self
                .escalate(&conversation, &customer, AlertType::MissedCall, "", at)
                .await;
            return Ok(MissedCallOutcome::Escalated {
                conversation_id: conversation.id,
                escalation,
            });
        }

        let template = self.settings.missed_call.template.trim();
        let receipt = self
            .transport
            .send(channel, phone.as_str(), template)
            .await?;
        if !receipt.sent {
            return Err(FrontdeskError::Transport {
                message: receipt.error.unwrap_or_else(|| "not sent".to_string()),
                source: None,
            });
        }

        let mut message = Message::new(conversation.id.clone(), Sender::System, template, at);
        message.delivery_status = Some("sent".to_string());
        message.delivery_provider = Some(receipt.provider);
        self.store.insert_message(&message).await?;
        info!(conversation_id = %conversation.id, "missed-call text sent");
        Ok(MissedCallOutcome::Replied {
            conversation_id: conversation.id,
        })
    }

    async fn learn_name_from_staff(
        &self,
        conversation: &Conversation,
        text: &str,
    ) -> Result<(), FrontdeskError> {
        let Some(customer) = self.store.get_customer(&conversation.customer_id).await? else {
            return Ok(());
        };
        if customer.name.is_some() {
            return Ok(());
        }
        let name = extract_name_from_signature(text, &self.signature_exclusions);
        self.update_contact(&customer, name, None).await;
        Ok(())
    }
}

fn automated_verdict(chain: &ChainOutcome) -> Option<(AutomatedCategory, String)> {
    let verdict = chain.automated()?;
    match verdict.label {
        Label::Automated(category) => Some((category, verdict.reason.clone())),
        _ => None,
    }
}

fn frozen_reason(status: ConversationStatus) -> Option<HoldReason> {
    match status {
        ConversationStatus::Archived => Some(HoldReason::Archived),
        ConversationStatus::Paused => Some(HoldReason::Paused),
        _ => None,
    }
}
