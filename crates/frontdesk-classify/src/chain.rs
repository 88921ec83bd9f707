// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered classifier chain.
//!
//! The pipeline runs every inbound message through the same fixed sequence:
//! autoresponder, acknowledgment, simple query, mode heuristic. An
//! autoresponder verdict short-circuits the rest; the others all contribute
//! to the [`ChainOutcome`] the mode state machine consumes.

use frontdesk_core::QueryCategory;
use serde::Serialize;

use crate::autoresponder::{self, AutomatedCategory};
use crate::{mode_hint, simple_query};

/// Coarse confidence attached to heuristic verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// What a classifier concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "label", content = "detail")]
pub enum Label {
    Automated(AutomatedCategory),
    Acknowledgment,
    SimpleQuery(QueryCategory),
    DirectedAtStaff,
    NeedsResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub classifier: &'static str,
    pub label: Label,
    pub confidence: Confidence,
    pub reason: String,
}

/// Input handed to each classifier.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub text: &'a str,
    /// Raw origin identifier (phone number, short code or sender ID).
    pub origin: &'a str,
}

/// A single heuristic stage.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` when the classifier has nothing to say about the input.
    fn classify(&self, input: &ClassifierInput<'_>) -> Option<Verdict>;

    /// Whether this verdict ends the chain.
    fn short_circuits(&self, _verdict: &Verdict) -> bool {
        false
    }
}

pub struct AutoresponderClassifier;

impl Classifier for AutoresponderClassifier {
    fn name(&self) -> &'static str {
        "autoresponder"
    }

    fn classify(&self, input: &ClassifierInput<'_>) -> Option<Verdict> {
        let category = autoresponder::detect(input.text, input.origin)?;
        Some(Verdict {
            classifier: self.name(),
            label: Label::Automated(category),
            confidence: Confidence::High,
            reason: category.reason().to_string(),
        })
    }

    fn short_circuits(&self, verdict: &Verdict) -> bool {
        matches!(verdict.label, Label::Automated(_))
    }
}

pub struct AcknowledgmentClassifier;

impl Classifier for AcknowledgmentClassifier {
    fn name(&self) -> &'static str {
        "acknowledgment"
    }

    fn classify(&self, input: &ClassifierInput<'_>) -> Option<Verdict> {
        mode_hint::is_acknowledgment(input.text).then(|| Verdict {
            classifier: self.name(),
            label: Label::Acknowledgment,
            confidence: Confidence::High,
            reason: "bare acknowledgment".to_string(),
        })
    }
}

pub struct SimpleQueryClassifier;

impl Classifier for SimpleQueryClassifier {
    fn name(&self) -> &'static str {
        "simple_query"
    }

    fn classify(&self, input: &ClassifierInput<'_>) -> Option<Verdict> {
        let category = simple_query::classify(input.text).category?;
        Some(Verdict {
            classifier: self.name(),
            label: Label::SimpleQuery(category),
            confidence: Confidence::Medium,
            reason: format!("{category} question"),
        })
    }
}

pub struct ModeHintClassifier;

impl Classifier for ModeHintClassifier {
    fn name(&self) -> &'static str {
        "mode_hint"
    }

    fn classify(&self, input: &ClassifierInput<'_>) -> Option<Verdict> {
        let (label, reason) = if mode_hint::is_directed_at_staff(input.text) {
            (Label::DirectedAtStaff, "addressed to staff")
        } else if mode_hint::should_auto_handle(input.text) {
            (Label::NeedsResponse, "question or substantive message")
        } else {
            return None;
        };
        Some(Verdict {
            classifier: self.name(),
            label,
            confidence: Confidence::Medium,
            reason: reason.to_string(),
        })
    }
}

/// Verdicts collected from one chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainOutcome {
    pub verdicts: Vec<Verdict>,
    pub short_circuited: bool,
}

impl ChainOutcome {
    /// The autoresponder verdict, if the message is automated.
    pub fn automated(&self) -> Option<&Verdict> {
        self.verdicts
            .iter()
            .find(|v| matches!(v.label, Label::Automated(_)))
    }

    pub fn is_acknowledgment(&self) -> bool {
        self.has(|l| matches!(l, Label::Acknowledgment))
    }

    pub fn simple_category(&self) -> Option<QueryCategory> {
        self.verdicts.iter().find_map(|v| match v.label {
            Label::SimpleQuery(category) => Some(category),
            _ => None,
        })
    }

    pub fn is_directed_at_staff(&self) -> bool {
        self.has(|l| matches!(l, Label::DirectedAtStaff))
    }

    /// Whether the mode heuristic wants automation to answer.
    pub fn should_auto_handle(&self) -> bool {
        self.has(|l| matches!(l, Label::NeedsResponse))
    }

    fn has(&self, pred: impl Fn(&Label) -> bool) -> bool {
        self.verdicts.iter().any(|v| pred(&v.label))
    }
}

/// Runs classifiers in a fixed order.
pub struct ClassifierChain {
    classifiers: Vec<Box<dyn Classifier>>,
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassifierChain {
    pub fn new(classifiers: Vec<Box<dyn Classifier>>) -> Self {
        Self { classifiers }
    }

    /// Autoresponder, acknowledgment, simple query, mode heuristic.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(AutoresponderClassifier),
            Box::new(AcknowledgmentClassifier),
            Box::new(SimpleQueryClassifier),
            Box::new(ModeHintClassifier),
        ])
    }

    pub fn run(&self, text: &str, origin: &str) -> ChainOutcome {
        let input = ClassifierInput { text, origin };
        let mut outcome = ChainOutcome::default();
        for classifier in &self.classifiers {
            let Some(verdict) = classifier.classify(&input) else {
                continue;
            };
            let stop = classifier.short_circuits(&verdict);
            tracing::trace!(
                classifier = classifier.name(),
                reason = %verdict.reason,
                stop,
                "classifier verdict"
            );
            outcome.verdicts.push(verdict);
            if stop {
                outcome.short_circuited = true;
                break;
            }
        }
        outcome
    }
}
