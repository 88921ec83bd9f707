// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automated and spam sender detection.
//!
//! Decides whether an inbound message came from a machine (delivery
//! notifications, verification codes, bank alerts, marketing) rather than a
//! person. Messages flagged here are dropped before any storage or
//! generation. Each positive result carries a category so every drop can be
//! audited.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Why a message was judged automated. Variants are listed in evaluation
/// priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomatedCategory {
    /// Origin is a 5-6 digit short code.
    ShortCode,
    /// Origin is an all-caps alphanumeric sender ID such as `ROYALMAIL`.
    SenderId,
    Delivery,
    OrderConfirmation,
    VerificationCode,
    Banking,
    /// Message opens with a known company name as a sender prefix.
    KnownSender,
    Marketing,
    /// Auto-reply boilerplate ("do not reply", "out of office").
    Boilerplate,
    /// Mostly upper-case words.
    Shouting,
    /// Several links in one message.
    LinkHeavy,
}

impl AutomatedCategory {
    /// Human-readable audit reason.
    pub fn reason(self) -> &'static str {
        match self {
            AutomatedCategory::ShortCode => "Short code sender",
            AutomatedCategory::SenderId => "Alphanumeric sender ID",
            AutomatedCategory::Delivery => "Delivery notification",
            AutomatedCategory::OrderConfirmation => "Order confirmation",
            AutomatedCategory::VerificationCode => "Verification code",
            AutomatedCategory::Banking => "Banking notification",
            AutomatedCategory::KnownSender => "Known automated sender",
            AutomatedCategory::Marketing => "Marketing message",
            AutomatedCategory::Boilerplate => "Automated message pattern detected",
            AutomatedCategory::Shouting => "Automated message pattern detected (capitalisation)",
            AutomatedCategory::LinkHeavy => "Automated message pattern detected (multiple links)",
        }
    }
}

impl std::fmt::Display for AutomatedCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

const DELIVERY_PHRASES: &[&str] = &[
    "your parcel",
    "your package",
    "out for delivery",
    "has been delivered",
    "was delivered",
    "delivery attempt",
    "missed delivery",
    "tracking number",
    "track your",
    "your courier",
    "delivery driver",
];

const ORDER_PHRASES: &[&str] = &[
    "order confirmation",
    "your order",
    "order number",
    "order #",
    "has been dispatched",
    "has shipped",
    "thank you for your order",
    "thanks for your order",
];

const BANKING_PHRASES: &[&str] = &[
    "card ending",
    "available balance",
    "direct debit",
    "transaction of",
    "payment of £",
    "your statement",
    "fraud alert",
    "online banking",
];

const MARKETING_PHRASES: &[&str] = &[
    "unsubscribe",
    "opt out",
    "opt-out",
    "reply stop",
    "text stop",
    "stop to end",
    "stop to opt",
    "t&cs apply",
    "terms and conditions apply",
    "limited time offer",
    "promo code",
    "free gift",
    "click here",
];

const BOILERPLATE_PHRASES: &[&str] = &[
    "this is an automated",
    "automated message",
    "do not reply",
    "don't reply to this",
    "no-reply",
    "noreply",
    "auto-reply",
    "automatic reply",
    "out of office",
];

static VERIFICATION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:verification|security|one[- ]time|login|confirmation|auth(?:entication)?) code\b|\botp\b|\bcode is:? ?\d{4,8}\b|\b\d{4,8} is your\b|do not share this code",
    )
    .unwrap()
});

// Company names only count as a sender-style prefix ("Amazon: ...",
// "[DPD] ..."). Customers routinely open with a device or brand name.
static KNOWN_SENDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:\[\s*(?:amazon|paypal|ebay|hmrc|dvla|nhs|uber|deliveroo|just eat|vinted|klarna|apple|google|dpd|evri|hermes|yodel|dhl|ups|fedex|royal mail|parcelforce)\s*\]|(?:amazon|paypal|ebay|hmrc|dvla|nhs|uber|deliveroo|just eat|vinted|klarna|apple|google|dpd|evri|hermes|yodel|dhl|ups|fedex|royal mail|parcelforce)\s*:)",
    )
    .unwrap()
});

static SENDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9 \-]{1,10}$").unwrap());

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap());

/// Classify a message. `None` means it looks human.
pub fn detect(text: &str, origin: &str) -> Option<AutomatedCategory> {
    if let Some(category) = detect_origin(origin) {
        return Some(category);
    }

    let lower = text.to_lowercase();
    if contains_any(&lower, DELIVERY_PHRASES) {
        return Some(AutomatedCategory::Delivery);
    }
    if contains_any(&lower, ORDER_PHRASES) {
        return Some(AutomatedCategory::OrderConfirmation);
    }
    if VERIFICATION_CODE.is_match(text) {
        return Some(AutomatedCategory::VerificationCode);
    }
    if contains_any(&lower, BANKING_PHRASES) {
        return Some(AutomatedCategory::Banking);
    }
    if KNOWN_SENDER.is_match(text) {
        return Some(AutomatedCategory::KnownSender);
    }
    if contains_any(&lower, MARKETING_PHRASES) {
        return Some(AutomatedCategory::Marketing);
    }
    if contains_any(&lower, BOILERPLATE_PHRASES) {
        return Some(AutomatedCategory::Boilerplate);
    }
    if is_shouting(text) {
        return Some(AutomatedCategory::Shouting);
    }
    if URL.find_iter(text).count() >= 2 {
        return Some(AutomatedCategory::LinkHeavy);
    }
    None
}

/// True iff the message should be treated as automated.
pub fn is_autoresponder(text: &str, origin: &str) -> bool {
    detect(text, origin).is_some()
}

/// Audit reason for the classification; `"Not automated"` for human text.
pub fn reason(text: &str, origin: &str) -> &'static str {
    detect(text, origin).map_or("Not automated", AutomatedCategory::reason)
}

fn detect_origin(origin: &str) -> Option<AutomatedCategory> {
    let origin = origin.trim();
    if origin.is_empty() {
        return None;
    }
    if (5..=6).contains(&origin.len()) && origin.chars().all(|c| c.is_ascii_digit()) {
        return Some(AutomatedCategory::ShortCode);
    }
    if origin.chars().any(|c| c.is_ascii_alphabetic()) && SENDER_ID.is_match(origin) {
        return Some(AutomatedCategory::SenderId);
    }
    None
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// More than 70% of words fully upper-case, over more than five words.
fn is_shouting(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= 5 {
        return false;
    }
    let caps = words
        .iter()
        .filter(|w| {
            let letters: Vec<char> = w.chars().filter(|c| c.is_alphabetic()).collect();
            letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
        })
        .count();
    caps * 10 > words.len() * 7
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUMAN: &str = "+447700900123";

    #[test]
    fn short_code_origin_is_automated() {
        assert_eq!(detect("Hi there", "60123"), Some(AutomatedCategory::ShortCode));
        assert_eq!(detect("Hi there", "861234"), Some(AutomatedCategory::ShortCode));
        assert_eq!(reason("Hi there", "60123"), "Short code sender");
    }

    #[test]
    fn sender_id_origin_is_automated() {
        assert_eq!(detect("Hello", "ROYALMAIL"), Some(AutomatedCategory::SenderId));
        assert_eq!(detect("Hello", "O2"), Some(AutomatedCategory::SenderId));
        assert_eq!(detect("Hello", "07700900123"), None);
        assert_eq!(detect("Hello", HUMAN), None);
    }

    #[test]
    fn origin_wins_over_text() {
        let text = "Your parcel is out for delivery";
        assert_eq!(detect(text, "60123"), Some(AutomatedCategory::ShortCode));
        assert_eq!(detect(text, HUMAN), Some(AutomatedCategory::Delivery));
    }

    #[test]
    fn phrase_families() {
        assert_eq!(
            detect("Thank you for your order! Ref 1234", HUMAN),
            Some(AutomatedCategory::OrderConfirmation)
        );
        assert_eq!(
            detect("Your verification code is 123456", HUMAN),
            Some(AutomatedCategory::VerificationCode)
        );
        assert_eq!(
            detect("482913 is your login code", HUMAN),
            Some(AutomatedCategory::VerificationCode)
        );
        assert_eq!(
            detect("A payment of £12.00 was made with card ending 1234", HUMAN),
            Some(AutomatedCategory::Banking)
        );
        assert_eq!(
            detect("Amazon: we're sorry, there's a problem", HUMAN),
            Some(AutomatedCategory::KnownSender)
        );
        assert_eq!(
            detect("[DPD] Your driver Sam is 10 mins away", HUMAN),
            Some(AutomatedCategory::KnownSender)
        );
        assert_eq!(
            detect("Royal Mail: we tried to deliver an item", HUMAN),
            Some(AutomatedCategory::KnownSender)
        );
        assert_eq!(
            detect("20% off this weekend. Reply STOP to opt out", HUMAN),
            Some(AutomatedCategory::Marketing)
        );
        assert_eq!(
            detect("This is an automated message, please do not reply", HUMAN),
            Some(AutomatedCategory::Boilerplate)
        );
    }

    #[test]
    fn structural_signals() {
        assert_eq!(
            detect("HUGE SALE NOW ON ALL PHONES TODAY ONLY", HUMAN),
            Some(AutomatedCategory::Shouting)
        );
        assert_eq!(
            detect("see https://a.example/x and https://b.example/y", HUMAN),
            Some(AutomatedCategory::LinkHeavy)
        );
        assert_eq!(
            reason("see https://a.example and www.b.example", HUMAN),
            "Automated message pattern detected (multiple links)"
        );
    }

    #[test]
    fn brand_and_courier_mentions_pass() {
        for text in [
            "Apple watch screen cracked, how much to fix?",
            "Google Pixel 7 won't charge",
            "UPS battery for my PC is beeping, do you sell them",
            "Can I send it to you by courier?",
            "I'll post it royal mail tomorrow",
            "Amazon fire tablet keeps restarting",
        ] {
            assert_eq!(detect(text, HUMAN), None, "flagged {text:?}");
        }
    }

    #[test]
    fn ordinary_customer_messages_pass() {
        for text in [
            "Hi, what time do you open tomorrow?",
            "My screen is cracked, can you fix it?",
            "I bought it on amazon last year, is that ok",
            "OK THANKS",
            "Is my phone ready yet? Ref https://photos.example/abc",
            "",
        ] {
            assert!(!is_autoresponder(text, HUMAN), "flagged {text:?}");
            assert_eq!(reason(text, HUMAN), "Not automated");
        }
    }
}
