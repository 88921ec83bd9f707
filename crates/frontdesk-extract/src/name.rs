// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Words that follow "I'm" / "this is" / "thanks" without being a name.
const NOT_NAMES: &[&str] = &[
    "a", "about", "after", "also", "an", "and", "at", "available", "back", "busy", "coming",
    "could", "fine", "for", "free", "from", "glad", "going", "good", "happy", "having", "here",
    "home", "hoping", "in", "interested", "just", "looking", "not", "ok", "okay", "on",
    "outside", "please", "ready", "so", "sorry", "still", "sure", "thank", "thanks", "the",
    "there", "trying", "urgent", "very", "waiting", "wondering", "you", "your", "monday",
    "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "again", "all",
    "everyone", "mate", "broken", "cracked", "smashed", "dead", "stuck", "frozen", "locked",
    "working", "fixed", "done", "new", "same", "late", "early", "confused", "frustrated",
    "annoyed", "worried", "afraid", "unable", "finished", "really", "only", "off", "out",
    "gone", "me", "it", "my", "this", "that", "what", "no", "yes",
];

/// "my name is sarah", accepts lower-case first names.
static EXPLICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:\bmy name(?:'s| is)\s+)([A-Za-z][A-Za-z'\-]*)(?:\s+([A-Z][A-Za-z'\-]*))?")
        .unwrap()
});

/// "I'm Sarah", "this is Sarah Jones"; the name must be capitalised.
static INTRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?i:i'm|i am|this is)\s+([A-Z][a-z'\-]+)(?:\s+([A-Z][a-z'\-]+))?")
        .unwrap()
});

/// "Sarah here".
static HERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z][a-z'\-]+)\s+(?i:here)\b").unwrap());

static GREETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?i:thanks|thank you|cheers|hi|hello|hey|dear|morning|afternoon|evening|ta)\s*,?\s+([A-Z][a-z'\-]+)\b",
    )
    .unwrap()
});

fn is_stopword(word: &str) -> bool {
    NOT_NAMES.contains(&word.to_lowercase().as_str())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How a customer name was phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// "my name is Sarah".
    Stated,
    /// "I'm Sarah", "this is Sarah".
    Introduced,
    /// "Sarah here".
    SignedIn,
}

/// A name the customer gave for themselves.
pub fn extract_customer_name(text: &str) -> Option<String> {
    find_customer_name(text).map(|(name, _)| name)
}

/// Like [`extract_customer_name`], also reporting which phrasing matched.
pub fn find_customer_name(text: &str) -> Option<(String, NameSource)> {
    for (re, source) in [
        (&*EXPLICIT, NameSource::Stated),
        (&*INTRO, NameSource::Introduced),
        (&*HERE, NameSource::SignedIn),
    ] {
        let Some(caps) = re.captures(text) else {
            continue;
        };
        let Some(first) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if is_stopword(first) {
            continue;
        }
        let mut name = capitalize(first);
        if let Some(last) = caps.get(2).map(|m| m.as_str())
            && !is_stopword(last)
        {
            name.push(' ');
            name.push_str(last);
        }
        return Some((name, source));
    }
    None
}

/// The customer's name from a staff reply ("Hi Sarah, ..."), skipping the
/// names in `excluded` (staff first names, the persona signature).
pub fn extract_name_from_signature(staff_text: &str, excluded: &[String]) -> Option<String> {
    let excluded: Vec<String> = excluded
        .iter()
        .flat_map(|e| e.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>())
        .collect();
    GREETING
        .captures_iter(staff_text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .find(|name| !is_stopword(name) && !excluded.contains(&name.to_lowercase()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_introductions() {
        assert_eq!(
            extract_customer_name("hi my name is sarah, is my phone ready").as_deref(),
            Some("Sarah")
        );
        assert_eq!(
            extract_customer_name("Hello, I'm Tom Baker and my laptop broke").as_deref(),
            Some("Tom Baker")
        );
        assert_eq!(extract_customer_name("Priya here, quick question").as_deref(), Some("Priya"));
    }

    #[test]
    fn false_introductions_are_rejected() {
        assert_eq!(extract_customer_name("I'm looking for a charger"), None);
        assert_eq!(extract_customer_name("I'm Outside now"), None);
        assert_eq!(extract_customer_name("this is urgent"), None);
        assert_eq!(extract_customer_name("It's Broken again, the screen flickers"), None);
        assert_eq!(extract_customer_name("I'm Frustrated, it's still Cracked"), None);
        assert_eq!(extract_customer_name(""), None);
    }

    #[test]
    fn name_source_reflects_phrasing() {
        assert_eq!(
            find_customer_name("my name's Sarah"),
            Some(("Sarah".to_string(), NameSource::Stated))
        );
        assert_eq!(
            find_customer_name("Hi, this is Tom"),
            Some(("Tom".to_string(), NameSource::Introduced))
        );
        assert_eq!(
            find_customer_name("Priya here"),
            Some(("Priya".to_string(), NameSource::SignedIn))
        );
    }

    #[test]
    fn staff_greeting_yields_customer_name() {
        let excluded = vec!["John".to_string(), "AI Steve".to_string()];
        assert_eq!(
            extract_name_from_signature("Hi Sarah, your phone is ready. Thanks, John", &excluded)
                .as_deref(),
            Some("Sarah")
        );
        assert_eq!(extract_name_from_signature("Thanks John", &excluded), None);
        assert_eq!(extract_name_from_signature("Cheers Steve", &excluded), None);
        assert_eq!(extract_name_from_signature("Hi there, all sorted", &excluded), None);
        assert_eq!(extract_name_from_signature("Thank You", &excluded), None);
    }
}
