// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline inspection commands: `normalize`, `classify`, `extract` and
//! `holiday`. None of them touch the store; each prints one JSON document so
//! operators can check how a message or notice will be treated.

use chrono::NaiveDate;
use serde::Serialize;

use frontdesk_classify::{
    holiday, simple_query, ChainOutcome, ClassifierChain, Confidence, HolidayStatus,
    SenderDetector, SimpleQuery,
};
use frontdesk_config::FrontdeskConfig;
use frontdesk_core::{PhoneNormalizer, Sender};
use frontdesk_extract::{extract_contact, extract_customer_name, ContactInfo};

#[derive(Debug, Serialize)]
pub struct NormalizeReport {
    pub input: String,
    pub canonical: Option<String>,
    pub display: Option<String>,
}

pub fn normalize(config: &FrontdeskConfig, raw: &str) -> NormalizeReport {
    let normalizer = PhoneNormalizer::new(config.identity.default_country_code.clone());
    let canonical = normalizer.normalize(raw);
    NormalizeReport {
        input: raw.to_string(),
        display: canonical
            .as_ref()
            .map(|_| normalizer.format_for_display(raw)),
        canonical,
    }
}

#[derive(Debug, Serialize)]
pub struct SenderReport {
    pub sender: Sender,
    pub confidence: Confidence,
    pub reason: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    pub chain: ChainOutcome,
    pub simple_query: SimpleQuery,
    /// Who wrote the text, had it been sent from the business number.
    pub outbound_sender: SenderReport,
}

pub fn classify(config: &FrontdeskConfig, text: &str, origin: &str) -> ClassifyReport {
    let detector = SenderDetector::new(
        &config.business.persona_signature,
        &config.business.staff_names,
    );
    let detection = detector.detect(text, Sender::Staff);
    ClassifyReport {
        chain: ClassifierChain::standard().run(text, origin),
        simple_query: simple_query::classify(text),
        outbound_sender: SenderReport {
            sender: detection.sender,
            confidence: detection.confidence,
            reason: detection.reason,
        },
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractReport {
    pub contact: ContactInfo,
    pub customer_name: Option<String>,
}

pub fn extract(text: &str) -> ExtractReport {
    ExtractReport {
        contact: extract_contact(text),
        customer_name: extract_customer_name(text),
    }
}

#[derive(Debug, Serialize)]
pub struct HolidayReport {
    pub notice: Option<String>,
    pub date: NaiveDate,
    pub status: HolidayStatus,
    pub active: bool,
}

/// Check a closure notice, defaulting to the configured one.
pub fn holiday(config: &FrontdeskConfig, notice: Option<&str>, date: NaiveDate) -> HolidayReport {
    let notice = notice
        .map(str::to_string)
        .or_else(|| config.business.special_notice.clone());
    let status = notice.as_deref().map(holiday::detect).unwrap_or_default();
    HolidayReport {
        active: status.is_active_on(date),
        notice,
        date,
        status,
    }
}
