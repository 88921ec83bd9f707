// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::LazyLock;

use frontdesk_core::{PhoneNormalizer, PhoneNumber};
use regex::Regex;
use serde::Serialize;

use crate::name::{NameSource, find_customer_name};

/// Phone-like run: optional `+`, digits with spaces, dashes or brackets.
static PHONE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d \-()]{8,16}\d").unwrap());

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}\b").unwrap()
});

/// Contact details found in one message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    /// First UK mobile number, canonical form.
    pub mobile: Option<PhoneNumber>,
    pub email: Option<String>,
    /// A UK landline was present. Landlines are never stored as the mobile.
    pub is_landline: bool,
    pub name_source: Option<NameSource>,
    /// 0.5 for a mobile, 0.4 for an email, 0.1 for a name.
    pub confidence: f32,
}

/// Below this, a casually introduced name is not saved without review.
pub const SAVE_NAME_CONFIDENCE: f32 = 0.5;

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.mobile.is_none() && self.email.is_none()
    }

    /// The name, if it is reliable enough to store unreviewed: stated
    /// outright ("my name is"), or given alongside a mobile or email.
    pub fn name_to_save(&self) -> Option<&str> {
        let reliable = self.name_source == Some(NameSource::Stated)
            || self.confidence + f32::EPSILON >= SAVE_NAME_CONFIDENCE;
        self.name.as_deref().filter(|_| reliable)
    }
}

enum UkLine {
    Mobile,
    Landline,
}

/// Scan `text` for a name, a UK mobile and an email address.
pub fn extract_contact(text: &str) -> ContactInfo {
    let normalizer = PhoneNormalizer::default();
    let mut mobile = None;
    let mut is_landline = false;

    for run in PHONE_RUN.find_iter(text) {
        let Some(phone) = normalizer.parse(run.as_str()) else {
            continue;
        };
        match classify_uk(&phone) {
            Some(UkLine::Mobile) if mobile.is_none() => mobile = Some(phone),
            Some(UkLine::Landline) => is_landline = true,
            _ => {}
        }
    }

    let email = EMAIL.find(text).map(|m| m.as_str().to_lowercase());
    let (name, name_source) = find_customer_name(text).unzip();

    let mut confidence = 0.0;
    if mobile.is_some() {
        confidence += 0.5;
    }
    if email.is_some() {
        confidence += 0.4;
    }
    if name.is_some() {
        confidence += 0.1;
    }

    ContactInfo {
        name,
        name_source,
        mobile,
        email,
        is_landline,
        confidence: f32::min(confidence, 1.0),
    }
}

fn classify_uk(phone: &PhoneNumber) -> Option<UkLine> {
    let national = phone.as_str().strip_prefix("+44")?;
    match national.as_bytes().first()? {
        b'7' if national.len() == 10 => Some(UkLine::Mobile),
        b'1' | b'2' | b'3' if (9..=10).contains(&national.len()) => Some(UkLine::Landline),
        _ => None,
    }
}
