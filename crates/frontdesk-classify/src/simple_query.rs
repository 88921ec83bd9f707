// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simple factual query detection.
//!
//! A simple query (opening hours, location, directions, contact details) can
//! be answered without conversation context, so the pipeline answers it even
//! while staff are handling the conversation. Anything that hints at a
//! price, a repair in progress or a fault description needs a human.

use std::sync::LazyLock;

use frontdesk_core::QueryCategory;
use regex::Regex;
use serde::Serialize;

/// Result of simple-query classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimpleQuery {
    pub is_simple: bool,
    pub category: Option<QueryCategory>,
}

impl SimpleQuery {
    const NOT_SIMPLE: SimpleQuery = SimpleQuery {
        is_simple: false,
        category: None,
    };
}

static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bwhat time (?:do|does|are|will) (?:you|u|the shop|the store)\b|\b(?:opening|closing) (?:hours|times?)\b|\bwhen (?:do|are|will) (?:you|u) (?:open|close|shut)|\bare (?:you|u) open\b|\bwhat are (?:your|ur) hours\b|\bopen (?:today|tomorrow|on (?:mon|tue|wed|thu|fri|sat|sun)[a-z]*)\b|\bwhat time (?:do|does) (?:you|it) (?:open|close|shut)\b",
    )
    .unwrap()
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bwhere (?:are|r) (?:you|u)\b|\bwhere is (?:the|your) (?:shop|store)\b|\byour address\b|\bwhat(?:'s| is) (?:the|your) (?:address|postcode)\b|\bwhere.{0,20}located\b|\bpost ?code\b",
    )
    .unwrap()
});

static DIRECTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bhow (?:do|can) i (?:get|find) (?:to )?(?:you|there|the shop|the store)\b|\bdirections\b|\bparking\b|\bnearest (?:station|bus stop|car park)\b|\bwhich bus\b",
    )
    .unwrap()
});

static CONTACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:phone|contact|landline) number\b|\bemail address\b|\bcontact details\b|\bhow (?:can|do) i (?:contact|reach|call|email) (?:you|u)\b|\bwhat(?:'s| is) (?:your|ur) (?:number|email)\b|\bcan i (?:call|ring) (?:you|u)\b",
    )
    .unwrap()
});

/// Pricing, repair status and fault descriptions. Any match disqualifies.
static COMPLEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bhow much\b|\bprices?\b|\bcosts?\b|\bquotes?\b|£|\bcharge\b|\bis my \w+ ready\b|\brepair status\b|\bstatus of my\b|\bany update\b|\bready (?:for|to) (?:collection|collect|pick ?up)\b|\bwhen will (?:it|my)\b|\bbroken\b|\bcracked\b|\bsmashed\b|\bnot working\b|\bwon'?t (?:turn|charge|switch|start)\b|\bdoesn'?t work\b|\bscreen\b|\bbattery\b|\bwater damage\b|\bfix\b",
    )
    .unwrap()
});

/// Classify a customer message.
pub fn classify(text: &str) -> SimpleQuery {
    if COMPLEX.is_match(text) {
        return SimpleQuery::NOT_SIMPLE;
    }
    let category = if HOURS.is_match(text) {
        QueryCategory::Hours
    } else if LOCATION.is_match(text) {
        QueryCategory::Location
    } else if DIRECTIONS.is_match(text) {
        QueryCategory::Directions
    } else if CONTACT.is_match(text) {
        QueryCategory::Contact
    } else {
        return SimpleQuery::NOT_SIMPLE;
    };
    SimpleQuery {
        is_simple: true,
        category: Some(category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(text: &str) -> Option<QueryCategory> {
        let q = classify(text);
        assert_eq!(q.is_simple, q.category.is_some());
        q.category
    }

    #[test]
    fn hours_questions() {
        assert_eq!(category("what time do you open?"), Some(QueryCategory::Hours));
        assert_eq!(category("Are you open on Sunday"), Some(QueryCategory::Hours));
        assert_eq!(category("opening hours pls"), Some(QueryCategory::Hours));
    }

    #[test]
    fn location_directions_contact() {
        assert_eq!(category("Where are you based?"), Some(QueryCategory::Location));
        assert_eq!(category("what's the postcode"), Some(QueryCategory::Location));
        assert_eq!(category("Is there parking nearby?"), Some(QueryCategory::Directions));
        assert_eq!(
            category("how do i get to you from the station"),
            Some(QueryCategory::Directions)
        );
        assert_eq!(category("What's your email?"), Some(QueryCategory::Contact));
    }

    #[test]
    fn complex_indicators_override() {
        assert_eq!(category("what time do you open and how much for a screen?"), None);
        assert_eq!(category("is my phone ready? what time do you close"), None);
        assert_eq!(category("are you open today, my laptop won't turn on"), None);
    }

    #[test]
    fn chatter_is_not_simple() {
        assert_eq!(category("thanks!"), None);
        assert_eq!(category(""), None);
        assert_eq!(category("I dropped it in the bath"), None);
    }
}
