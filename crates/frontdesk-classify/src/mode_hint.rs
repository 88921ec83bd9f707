// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Should automation answer this at all?
//!
//! Two heuristics feed the conversation-mode state machine: pure
//! acknowledgments ("ok thanks", "cheers john") never need a reply, and
//! messages aimed at a staff member ("on my way", "see you soon") belong to
//! the human who is handling the conversation.

use std::sync::LazyLock;

use regex::Regex;

/// Longest message, in words, still treated as a bare acknowledgment.
const MAX_ACK_WORDS: usize = 6;

/// Messages longer than this are assumed to need a reply.
const SUBSTANTIVE_WORDS: usize = 5;

static ACK_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:ok(?:ay)?|kk?|thanks?|thank you|thx|ty|cheers|ta|bye|goodbye|great|perfect|lovely|brilliant|cool|nice|fab|amazing|no worries|no problem|will do|sounds good|see you|got it|noted)\b|👍|🙏)",
    )
    .unwrap()
});

static QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:what|when|where|how|why|who|which|can|could|do|does|is|are|will|would|have|has)\b|\b(?:what|when|where|how|why)\b.*\b(?:you|your|it|i)\b|\b(?:i need|i want|i'?d like|looking for|help|price|quote|book|appointment)\b",
    )
    .unwrap()
});

static DIRECTED_AT_STAFF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:on my way|omw|be there (?:in|at|soon|shortly)|see you (?:soon|later|then|tomorrow|shortly|in a bit)|running late|i'?m outside|i'?m here|just arrived|thanks? (?:mate|pal|again|so much)|cheers (?:mate|pal))\b",
    )
    .unwrap()
});

/// True for a bare thanks/ok/bye with nothing that needs an answer.
pub fn is_acknowledgment(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.contains('?') {
        return false;
    }
    let words = text.split_whitespace().count();
    words <= MAX_ACK_WORDS && ACK_OPENER.is_match(text) && !QUESTION.is_match(text)
}

/// True when the message is addressed to a person rather than a question
/// for the business.
pub fn is_directed_at_staff(text: &str) -> bool {
    is_acknowledgment(text) || DIRECTED_AT_STAFF.is_match(text)
}

/// Whether automation should handle this message. Staff-directed patterns
/// take priority over question cues.
pub fn should_auto_handle(text: &str) -> bool {
    if is_directed_at_staff(text) {
        return false;
    }
    text.contains('?')
        || QUESTION.is_match(text)
        || text.split_whitespace().count() > SUBSTANTIVE_WORDS
}
