// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staff vs automated persona detection.
//!
//! Staff and the automated persona share one outbound number, so a sent
//! message cannot be attributed by origin. This module attributes it by
//! content: the persona signs off with its signature, staff sign off with
//! their first name, and the persona refers to staff in the third person.

use frontdesk_core::Sender;

use crate::chain::Confidence;

/// Result of content-based sender attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderDetection {
    pub sender: Sender,
    pub confidence: Confidence,
    pub reason: &'static str,
}

/// Phrases only the automated persona uses about itself.
const PERSONA_PHRASES: &[&str] = &[
    "i'm here to help",
    "i am here to help",
    "as an ai",
    "ai assistant",
    "virtual assistant",
    "automated assistant",
    "i'm an ai",
    "i am an ai",
    "i've passed",
    "i have passed",
    "a member of our team",
    "a member of the team",
    "our team will",
];

/// Third-person templates; `{}` is replaced by a lower-case staff name.
const THIRD_PERSON_TEMPLATES: &[&str] = &[
    "pass this to {}",
    "pass it to {}",
    "pass that to {}",
    "pass this on to {}",
    "pass your message to {}",
    "pass you to {}",
    "passed this to {}",
    "passed your message to {}",
    "passed it on to {}",
    "forwarded to {}",
    "let {} know",
    "ask {}",
    "check with {}",
    "speak to {}",
    "speak with {}",
    "{} will",
    "{}'ll",
    "{} is",
    "{} can",
    "{} has",
    "{} should",
];

/// Content-based sender attribution for one business.
#[derive(Debug, Clone)]
pub struct SenderDetector {
    persona: String,
    staff: Vec<StaffName>,
}

/// A lower-cased staff first name and its third-person phrasings.
#[derive(Debug, Clone)]
struct StaffName {
    name: String,
    mentions: Vec<String>,
}

impl StaffName {
    fn new(name: String) -> Self {
        let mentions = THIRD_PERSON_TEMPLATES
            .iter()
            .map(|t| t.replace("{}", &name))
            .collect();
        Self { name, mentions }
    }

    fn mentioned_in(&self, lower: &str) -> bool {
        self.mentions.iter().any(|p| contains_phrase(lower, p))
    }
}

impl SenderDetector {
    pub fn new(persona_signature: &str, staff_names: &[String]) -> Self {
        let staff = staff_names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .map(StaffName::new)
            .collect();
        Self {
            persona: persona_signature.trim().to_lowercase(),
            staff,
        }
    }

    /// Attribute `text`. Low-confidence results carry `fallback` unchanged.
    ///
    /// A closing signature decides at high confidence, the persona's ahead
    /// of a staff member's. Naming a staff member in the third person only
    /// rules that name out as the signer.
    pub fn detect(&self, text: &str, fallback: Sender) -> SenderDetection {
        let lower = text.to_lowercase();
        let tail = lower.trim_end_matches(|c: char| !c.is_alphanumeric());

        if !self.persona.is_empty() && ends_with_word(tail, &self.persona) {
            return SenderDetection {
                sender: Sender::Ai,
                confidence: Confidence::High,
                reason: "persona signature",
            };
        }

        let signed_by_staff = self
            .staff
            .iter()
            .any(|staff| ends_with_word(tail, &staff.name) && !staff.mentioned_in(&lower));
        if signed_by_staff {
            return SenderDetection {
                sender: Sender::Staff,
                confidence: Confidence::High,
                reason: "staff sign-off",
            };
        }
        if self.staff.iter().any(|staff| staff.mentioned_in(&lower)) {
            return SenderDetection {
                sender: Sender::Ai,
                confidence: Confidence::Medium,
                reason: "refers to staff in the third person",
            };
        }
        if PERSONA_PHRASES.iter().any(|p| lower.contains(p)) {
            return SenderDetection {
                sender: Sender::Ai,
                confidence: Confidence::Medium,
                reason: "persona phrasing",
            };
        }
        SenderDetection {
            sender: fallback,
            confidence: Confidence::Low,
            reason: "no attribution signal",
        }
    }

    /// The sender a stored message should carry. Overrides `recorded` only
    /// on high confidence, or medium confidence that the persona wrote it.
    pub fn correct_sender(&self, text: &str, recorded: Sender) -> Sender {
        let detection = self.detect(text, recorded);
        match (detection.confidence, detection.sender) {
            (Confidence::High, sender) => sender,
            (Confidence::Medium, Sender::Ai) => Sender::Ai,
            _ => recorded,
        }
    }
}

/// `haystack` ends with `word` and `word` starts at a word boundary.
fn ends_with_word(haystack: &str, word: &str) -> bool {
    haystack.strip_suffix(word).is_some_and(|before| {
        before
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

/// `phrase` occurs in `haystack` bounded by non-alphanumerics on both sides.
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    haystack.match_indices(phrase).any(|(start, _)| {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[start + phrase.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
