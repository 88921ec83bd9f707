// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation mode state machine.
//!
//! `auto` conversations are answered by the generator, `manual` ones belong
//! to staff, `paused` ones are frozen by the kill switch and `archived` is
//! terminal. [`evaluate`] is the pure decision for a released batch;
//! [`ModeController`] validates transitions and writes them to the store
//! before anything downstream observes the new status.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use frontdesk_classify::ChainOutcome;
use frontdesk_core::{
    Conversation, ConversationId, ConversationStatus, ConversationStore, FrontdeskError,
    ResponseScope, Sender,
};
use frontdesk_throttle::{BatchKey, MessageBatcher};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::recording;

/// Why a status changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// A staff reply was recorded.
    StaffMessage,
    /// The customer addressed staff while they were still engaged.
    DirectedAtStaff,
    /// The staff cooldown ran out.
    CooldownElapsed,
    Resume,
    Takeover,
    Archive,
    KillSwitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: ConversationStatus,
    pub to: ConversationStatus,
    pub cause: TransitionCause,
}

/// Validate a status change. Archived is terminal and paused is only
/// entered or left through the kill switch.
pub fn check_transition(
    from: ConversationStatus,
    to: ConversationStatus,
    cause: TransitionCause,
) -> Result<Transition, FrontdeskError> {
    use ConversationStatus::{Archived, Auto, Manual, Paused};
    use TransitionCause as C;

    let allowed = match (from, to) {
        (Archived, _) => false,
        (_, Archived) => cause == C::Archive,
        (Paused, Auto | Manual) | (Auto | Manual, Paused) => cause == C::KillSwitch,
        (Paused, Paused) => false,
        (Auto, Manual) => matches!(cause, C::StaffMessage | C::DirectedAtStaff | C::Takeover),
        (Manual, Auto) => matches!(cause, C::CooldownElapsed | C::Resume),
        (Auto, Auto) => cause == C::Resume,
        (Manual, Manual) => cause == C::Takeover,
    };

    if allowed {
        Ok(Transition { from, to, cause })
    } else {
        Err(FrontdeskError::InvalidTransition { from, to })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HoldReason {
    Archived,
    Paused,
    Acknowledgment,
    StaffCooldown,
    DirectedAtStaff,
}

/// What to do with a released batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ModeDecision {
    Respond {
        scope: ResponseScope,
        transition: Option<Transition>,
    },
    Hold {
        reason: HoldReason,
        cooldown_remaining_minutes: Option<i64>,
        /// Staff should be alerted that the customer is waiting.
        escalate: bool,
        transition: Option<Transition>,
    },
}

impl ModeDecision {
    pub fn transition(&self) -> Option<Transition> {
        match self {
            ModeDecision::Respond { transition, .. } | ModeDecision::Hold { transition, .. } => {
                *transition
            }
        }
    }

    pub fn is_respond(&self) -> bool {
        matches!(self, ModeDecision::Respond { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModeDecision::Respond { .. } => "respond",
            ModeDecision::Hold { .. } => "hold",
        }
    }

    fn hold(reason: HoldReason) -> Self {
        ModeDecision::Hold {
            reason,
            cooldown_remaining_minutes: None,
            escalate: false,
            transition: None,
        }
    }
}

/// Decide whether automation answers a batch.
///
/// `minutes_since_staff` is the whole minutes since staff last engaged with
/// the conversation, `None` when they never have. In manual mode the reply
/// resumes once `cooldown_minutes` have passed; before that only simple
/// factual queries are answered, scoped to their category.
pub fn evaluate(
    status: ConversationStatus,
    chain: &ChainOutcome,
    minutes_since_staff: Option<i64>,
    cooldown_minutes: i64,
) -> ModeDecision {
    let remaining = minutes_since_staff.map(|m| (cooldown_minutes - m.max(0)).max(0));

    match status {
        ConversationStatus::Archived => ModeDecision::hold(HoldReason::Archived),
        ConversationStatus::Paused => ModeDecision::hold(HoldReason::Paused),
        ConversationStatus::Auto => {
            let staff_engaged = minutes_since_staff.is_some_and(|m| m < cooldown_minutes);
            if staff_engaged && chain.is_directed_at_staff() && chain.simple_category().is_none() {
                return ModeDecision::Hold {
                    reason: HoldReason::DirectedAtStaff,
                    cooldown_remaining_minutes: remaining,
                    escalate: !chain.is_acknowledgment(),
                    transition: Some(Transition {
                        from: ConversationStatus::Auto,
                        to: ConversationStatus::Manual,
                        cause: TransitionCause::DirectedAtStaff,
                    }),
                };
            }
            ModeDecision::Respond {
                scope: ResponseScope::Full,
                transition: None,
            }
        }
        ConversationStatus::Manual => {
            if minutes_since_staff.is_none_or(|m| m >= cooldown_minutes) {
                return ModeDecision::Respond {
                    scope: ResponseScope::Full,
                    transition: Some(Transition {
                        from: ConversationStatus::Manual,
                        to: ConversationStatus::Auto,
                        cause: TransitionCause::CooldownElapsed,
                    }),
                };
            }
            if chain.is_acknowledgment() {
                return ModeDecision::Hold {
                    reason: HoldReason::Acknowledgment,
                    cooldown_remaining_minutes: remaining,
                    escalate: false,
                    transition: None,
                };
            }
            if let Some(category) = chain.simple_category() {
                return ModeDecision::Respond {
                    scope: ResponseScope::SimpleQueryOnly(category),
                    transition: None,
                };
            }
            ModeDecision::Hold {
                reason: HoldReason::StaffCooldown,
                cooldown_remaining_minutes: remaining,
                escalate: true,
                transition: None,
            }
        }
    }
}

/// Whole minutes from `since` to `now`.
pub fn minutes_between(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_minutes()
}

/// Bulk operations skip conversations another writer moved since they were
/// listed. `Ok(true)` means the transition was written.
fn skip_conflict(
    conversation: &Conversation,
    applied: Result<Transition, FrontdeskError>,
) -> Result<bool, FrontdeskError> {
    match applied {
        Ok(_) => Ok(true),
        Err(FrontdeskError::StatusConflict { expected, .. }) => {
            debug!(
                conversation_id = %conversation.id,
                %expected,
                "conversation changed concurrently, skipped"
            );
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Dashboard view of a conversation's mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationView {
    pub conversation: Conversation,
    pub last_staff_message_at: Option<DateTime<Utc>>,
    /// Minutes until a manual conversation returns to auto.
    pub cooldown_remaining_minutes: Option<i64>,
}

/// Applies and persists mode transitions.
pub struct ModeController {
    store: Arc<dyn ConversationStore>,
    batcher: Arc<MessageBatcher>,
    cooldown_minutes: i64,
}

impl ModeController {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        batcher: Arc<MessageBatcher>,
        cooldown_minutes: i64,
    ) -> Self {
        Self {
            store,
            batcher,
            cooldown_minutes,
        }
    }

    pub fn cooldown_minutes(&self) -> i64 {
        self.cooldown_minutes
    }

    /// When staff engagement started counting. A manual conversation counts
    /// from its last staff message, or from the moment it became manual if
    /// that is later. The kill switch does not move `updated_at`, so a
    /// conversation restored to manual keeps its original reference.
    pub async fn staff_reference(
        &self,
        conversation: &Conversation,
    ) -> Result<Option<DateTime<Utc>>, FrontdeskError> {
        let last_staff = self
            .store
            .last_message_at(&conversation.id, Sender::Staff)
            .await?;
        Ok(match conversation.status {
            ConversationStatus::Manual => Some(
                last_staff.map_or(conversation.updated_at, |t| t.max(conversation.updated_at)),
            ),
            _ => last_staff,
        })
    }

    /// Validate, persist, then publish the new status into `conversation`.
    pub async fn apply(
        &self,
        conversation: &mut Conversation,
        to: ConversationStatus,
        cause: TransitionCause,
        now: DateTime<Utc>,
    ) -> Result<Transition, FrontdeskError> {
        self.commit(conversation, to, cause, now, |_| {}).await
    }

    /// Flip an auto conversation to manual after a staff reply.
    pub async fn record_staff_activity(
        &self,
        conversation: &mut Conversation,
        now: DateTime<Utc>,
    ) -> Result<Option<Transition>, FrontdeskError> {
        if conversation.status != ConversationStatus::Auto {
            return Ok(None);
        }
        self.apply(conversation, ConversationStatus::Manual, TransitionCause::StaffMessage, now)
            .await
            .map(Some)
    }

    pub async fn resume(
        &self,
        id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        let mut conversation = self.load(id).await?;
        self.commit(
            &mut conversation,
            ConversationStatus::Auto,
            TransitionCause::Resume,
            now,
            |c| c.assigned_to = None,
        )
        .await?;
        Ok(conversation)
    }

    pub async fn takeover(
        &self,
        id: &ConversationId,
        assignee: &str,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        let mut conversation = self.load(id).await?;
        let assignee = assignee.trim().to_string();
        self.commit(
            &mut conversation,
            ConversationStatus::Manual,
            TransitionCause::Takeover,
            now,
            move |c| c.assigned_to = Some(assignee),
        )
        .await?;
        Ok(conversation)
    }

    pub async fn archive(
        &self,
        id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<Conversation, FrontdeskError> {
        let mut conversation = self.load(id).await?;
        self.apply(&mut conversation, ConversationStatus::Archived, TransitionCause::Archive, now)
            .await?;
        Ok(conversation)
    }

    /// Kill switch: pause every auto and manual conversation, remembering
    /// each one's prior status. Returns how many were paused.
    pub async fn pause_all(&self, now: DateTime<Utc>) -> Result<usize, FrontdeskError> {
        let mut paused = 0;
        for status in [ConversationStatus::Auto, ConversationStatus::Manual] {
            for mut conversation in self.store.list_conversations(Some(status)).await? {
                let applied = self
                    .apply(&mut conversation, ConversationStatus::Paused, TransitionCause::KillSwitch, now)
                    .await;
                if skip_conflict(&conversation, applied)? {
                    paused += 1;
                }
            }
        }
        info!(paused, "kill switch engaged");
        Ok(paused)
    }

    /// Restore every paused conversation to the status it was paused from.
    pub async fn resume_all(&self, now: DateTime<Utc>) -> Result<usize, FrontdeskError> {
        let mut resumed = 0;
        for mut conversation in self
            .store
            .list_conversations(Some(ConversationStatus::Paused))
            .await?
        {
            let target = conversation.paused_from.unwrap_or_else(|| {
                warn!(
                    conversation_id = %conversation.id,
                    "paused conversation has no prior status, restoring to auto"
                );
                ConversationStatus::Auto
            });
            let applied = self
                .apply(&mut conversation, target, TransitionCause::KillSwitch, now)
                .await;
            if skip_conflict(&conversation, applied)? {
                resumed += 1;
            }
        }
        info!(resumed, "kill switch released");
        Ok(resumed)
    }

    pub async fn snapshot(
        &self,
        id: &ConversationId,
        now: DateTime<Utc>,
    ) -> Result<ConversationView, FrontdeskError> {
        let conversation = self.load(id).await?;
        let last_staff_message_at = self
            .store
            .last_message_at(&conversation.id, Sender::Staff)
            .await?;
        let cooldown_remaining_minutes = if conversation.status == ConversationStatus::Manual {
            self.staff_reference(&conversation)
                .await?
                .map(|since| self.cooldown_minutes - minutes_between(since, now).max(0))
                .filter(|remaining| *remaining > 0)
        } else {
            None
        };
        Ok(ConversationView {
            conversation,
            last_staff_message_at,
            cooldown_remaining_minutes,
        })
    }

    /// Return manual conversations whose staff cooldown has lapsed to auto.
    pub async fn reset_stale_manual(&self, now: DateTime<Utc>) -> Result<usize, FrontdeskError> {
        let mut reset = 0;
        for mut conversation in self
            .store
            .list_conversations(Some(ConversationStatus::Manual))
            .await?
        {
            let Some(since) = self.staff_reference(&conversation).await? else {
                continue;
            };
            if minutes_between(since, now) < self.cooldown_minutes {
                continue;
            }
            let applied = self
                .apply(
                    &mut conversation,
                    ConversationStatus::Auto,
                    TransitionCause::CooldownElapsed,
                    now,
                )
                .await;
            if skip_conflict(&conversation, applied)? {
                reset += 1;
            }
        }
        Ok(reset)
    }

    async fn load(&self, id: &ConversationId) -> Result<Conversation, FrontdeskError> {
        self.store
            .get_conversation(id)
            .await?
            .ok_or_else(|| FrontdeskError::NotFound {
                entity: "conversation",
                id: id.to_string(),
            })
    }

    async fn commit(
        &self,
        conversation: &mut Conversation,
        to: ConversationStatus,
        cause: TransitionCause,
        now: DateTime<Utc>,
        edit: impl FnOnce(&mut Conversation),
    ) -> Result<Transition, FrontdeskError> {
        let transition = check_transition(conversation.status, to, cause)?;

        let mut updated = conversation.clone();
        updated.status = to;
        if cause != TransitionCause::KillSwitch {
            updated.updated_at = now;
        }
        updated.paused_from = match (cause, to) {
            (TransitionCause::KillSwitch, ConversationStatus::Paused) => Some(conversation.status),
            (_, ConversationStatus::Paused) => conversation.paused_from,
            _ => None,
        };
        edit(&mut updated);

        self.store
            .update_conversation(&updated, conversation.status)
            .await?;
        *conversation = updated;

        if to != ConversationStatus::Auto {
            self.batcher.cancel(&BatchKey::new(
                conversation.customer_id.clone(),
                conversation.id.clone(),
            ));
        }

        if transition.from != transition.to {
            recording::record_transition(
                &transition.from.to_string(),
                &transition.to.to_string(),
            );
            info!(
                conversation_id = %conversation.id,
                from = %transition.from,
                to = %transition.to,
                cause = %transition.cause,
                "conversation mode changed"
            );
        }
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_classify::ClassifierChain;
    use frontdesk_core::QueryCategory;
    use ConversationStatus::{Archived, Auto, Manual, Paused};

    const COOLDOWN: i64 = 30;

    fn chain(text: &str) -> ChainOutcome {
        ClassifierChain::standard().run(text, "+447700900123")
    }

    #[test]
    fn archived_is_terminal() {
        for to in [Auto, Manual, Paused, Archived] {
            for cause in [TransitionCause::Resume, TransitionCause::Archive, TransitionCause::KillSwitch] {
                assert!(check_transition(Archived, to, cause).is_err());
            }
        }
    }

    #[test]
    fn paused_only_through_kill_switch() {
        assert!(check_transition(Auto, Paused, TransitionCause::KillSwitch).is_ok());
        assert!(check_transition(Manual, Paused, TransitionCause::KillSwitch).is_ok());
        assert!(check_transition(Paused, Manual, TransitionCause::KillSwitch).is_ok());
        assert!(check_transition(Auto, Paused, TransitionCause::Takeover).is_err());
        assert!(check_transition(Paused, Auto, TransitionCause::Resume).is_err());
        assert!(check_transition(Paused, Archived, TransitionCause::Archive).is_ok());
    }

    #[test]
    fn auto_manual_causes() {
        assert!(check_transition(Auto, Manual, TransitionCause::StaffMessage).is_ok());
        assert!(check_transition(Manual, Auto, TransitionCause::CooldownElapsed).is_ok());
        assert!(check_transition(Manual, Auto, TransitionCause::StaffMessage).is_err());
        assert!(check_transition(Auto, Manual, TransitionCause::CooldownElapsed).is_err());
        let err = check_transition(Auto, Archived, TransitionCause::Resume).unwrap_err();
        assert!(matches!(err, FrontdeskError::InvalidTransition { from: Auto, to: Archived }));
    }

    #[test]
    fn auto_responds_in_full() {
        let decision = evaluate(Auto, &chain("do you fix ipads?"), None, COOLDOWN);
        assert_eq!(
            decision,
            ModeDecision::Respond {
                scope: ResponseScope::Full,
                transition: None
            }
        );
    }

    #[test]
    fn simple_query_answered_during_cooldown() {
        let decision = evaluate(Manual, &chain("what time do you close?"), Some(5), COOLDOWN);
        assert_eq!(
            decision,
            ModeDecision::Respond {
                scope: ResponseScope::SimpleQueryOnly(QueryCategory::Hours),
                transition: None
            }
        );
    }

    #[test]
    fn acknowledgment_held_without_escalation() {
        let decision = evaluate(Manual, &chain("cheers john"), Some(5), COOLDOWN);
        assert_eq!(
            decision,
            ModeDecision::Hold {
                reason: HoldReason::Acknowledgment,
                cooldown_remaining_minutes: Some(25),
                escalate: false,
                transition: None
            }
        );
    }

    #[test]
    fn cooldown_boundary() {
        let text = chain("can you check on my laptop for me");
        let held = evaluate(Manual, &text, Some(29), COOLDOWN);
        assert!(matches!(
            held,
            ModeDecision::Hold {
                reason: HoldReason::StaffCooldown,
                cooldown_remaining_minutes: Some(1),
                escalate: true,
                ..
            }
        ));

        let resumed = evaluate(Manual, &text, Some(30), COOLDOWN);
        assert!(resumed.is_respond());
        assert_eq!(
            resumed.transition().map(|t| (t.from, t.to)),
            Some((Manual, Auto))
        );
    }

    #[test]
    fn staff_directed_message_in_auto_flips_to_manual() {
        let decision = evaluate(Auto, &chain("on my way, be there in 10"), Some(3), COOLDOWN);
        assert_eq!(decision.label(), "hold");
        assert_eq!(
            decision.transition(),
            Some(Transition {
                from: Auto,
                to: Manual,
                cause: TransitionCause::DirectedAtStaff
            })
        );

        let no_staff = evaluate(Auto, &chain("on my way, be there in 10"), None, COOLDOWN);
        assert!(no_staff.is_respond());
    }

    #[test]
    fn frozen_statuses_hold() {
        for (status, reason) in [(Paused, HoldReason::Paused), (Archived, HoldReason::Archived)] {
            assert_eq!(
                evaluate(status, &chain("what time do you close?"), None, COOLDOWN),
                ModeDecision::Hold {
                    reason,
                    cooldown_remaining_minutes: None,
                    escalate: false,
                    transition: None
                }
            );
        }
    }
}
