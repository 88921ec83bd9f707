// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical phone identity.
//!
//! A customer is identified by exactly one string: `+`, country code, national
//! number, no separators. [`PhoneNumber`] can only be built through
//! [`PhoneNormalizer`], so two raw inputs that normalize identically always
//! compare equal and raw strings never leak into identity checks.

use serde::{Deserialize, Serialize};

/// Default country code (UK).
pub const DEFAULT_COUNTRY_CODE: &str = "44";

/// Length of a UK national significant number (no trunk `0`).
const NATIONAL_LENGTH: usize = 10;

/// A normalized, country-coded phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize `raw` with the default (UK) rules.
    pub fn parse(raw: &str) -> Option<Self> {
        PhoneNormalizer::default().parse(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits only, without the leading `+`.
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PhoneNumber::parse(&value).ok_or_else(|| format!("`{value}` is not a phone number"))
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Region-aware phone normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNormalizer {
    country_code: String,
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}

impl PhoneNormalizer {
    /// Create a normalizer that assumes `country_code` (digits, no `+`) for
    /// national-format input.
    pub fn new(country_code: impl Into<String>) -> Self {
        let country_code: String = country_code
            .into()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        Self { country_code }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Canonicalize a raw phone string. Returns `None` when nothing usable
    /// remains after stripping separators.
    ///
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();
        let has_plus = cleaned.starts_with('+');
        let digits: String = cleaned.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }

        let cc = self.country_code.as_str();
        if has_plus {
            return self.finish(&digits);
        }
        if let Some(rest) = digits.strip_prefix("00") {
            return self.finish(rest);
        }
        if !cc.is_empty() && digits.starts_with(cc) && digits.len() > NATIONAL_LENGTH {
            return self.finish(&digits);
        }
        if let Some(rest) = digits.strip_prefix('0') {
            if rest.is_empty() {
                return None;
            }
            return self.finish(&format!("{cc}{rest}"));
        }
        if digits.len() == NATIONAL_LENGTH || digits.len() == NATIONAL_LENGTH - 1 {
            return self.finish(&format!("{cc}{digits}"));
        }
        self.finish(&digits)
    }

    /// Build the canonical string, dropping a trunk `0` written after the
    /// country code (`+44 (0)7700 ...`).
    fn finish(&self, digits: &str) -> Option<String> {
        if digits.is_empty() {
            return None;
        }
        let cc = self.country_code.as_str();
        if !cc.is_empty()
            && let Some(rest) = digits.strip_prefix(cc)
            && rest.starts_with('0')
        {
            return Some(format!("+{cc}{}", rest.trim_start_matches('0')));
        }
        Some(format!("+{digits}"))
    }

    /// Normalize into a typed identity.
    pub fn parse(&self, raw: &str) -> Option<PhoneNumber> {
        self.normalize(raw).map(PhoneNumber)
    }

    /// Compare two raw numbers by canonical form. `false` if either side
    /// does not normalize.
    pub fn equal(&self, a: &str, b: &str) -> bool {
        match (self.normalize(a), self.normalize(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Render a number in local human-readable grouping, or `"Unknown"`.
    pub fn format_for_display(&self, raw: &str) -> String {
        let Some(canonical) = self.normalize(raw) else {
            return "Unknown".to_string();
        };
        let prefix = format!("+{}", self.country_code);
        let Some(rest) = canonical.strip_prefix(&prefix) else {
            return canonical;
        };
        let national = format!("0{rest}");
        if national.len() != NATIONAL_LENGTH + 1 {
            return canonical;
        }
        if national.starts_with("02") {
            format!("{} {} {}", &national[..3], &national[3..7], &national[7..])
        } else {
            format!("{} {}", &national[..5], &national[5..])
        }
    }
}

/// Normalize with the default (UK) rules.
pub fn normalize(raw: &str) -> Option<String> {
    PhoneNormalizer::default().normalize(raw)
}

/// Compare two raw numbers with the default (UK) rules.
pub fn equal(a: &str, b: &str) -> bool {
    PhoneNormalizer::default().equal(a, b)
}

/// Display formatting with the default (UK) rules.
pub fn format_for_display(raw: &str) -> String {
    PhoneNormalizer::default().format_for_display(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn uk_formats_share_one_identity() {
        let expected = Some("+447700900123".to_string());
        for raw in [
            "07700 900123",
            "07700-900-123",
            "(07700) 900.123",
            "+44 7700 900123",
            "+44 (0)7700 900123",
            "0044 7700 900123",
            "447700900123",
            "7700900123",
        ] {
            assert_eq!(normalize(raw), expected, "input {raw:?}");
        }
    }

    #[test]
    fn empty_and_garbage_normalize_to_none() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("call me"), None);
        assert_eq!(normalize("+"), None);
        assert_eq!(normalize("00"), None);
    }

    #[test]
    fn foreign_numbers_keep_their_country_code() {
        assert_eq!(normalize("+1 (415) 555-0100").as_deref(), Some("+14155550100"));
        assert_eq!(normalize("00353 1 234 5678").as_deref(), Some("+35312345678"));
    }

    #[test]
    fn short_codes_are_kept_verbatim() {
        assert_eq!(normalize("60123").as_deref(), Some("+60123"));
    }

    #[test]
    fn equal_requires_both_sides() {
        assert!(equal("07700 900123", "+447700900123"));
        assert!(!equal("07700 900123", "07700 900124"));
        assert!(!equal("", ""));
        assert!(!equal("07700 900123", "n/a"));
    }

    #[test]
    fn display_groups_uk_numbers() {
        assert_eq!(format_for_display("+447700900123"), "07700 900123");
        assert_eq!(format_for_display("02079460000"), "020 7946 0000");
        assert_eq!(format_for_display("01632 960123"), "01632 960123");
        assert_eq!(format_for_display("+14155550100"), "+14155550100");
        assert_eq!(format_for_display("nothing"), "Unknown");
    }

    #[test]
    fn custom_country_code() {
        let ie = PhoneNormalizer::new("+353");
        assert_eq!(ie.country_code(), "353");
        assert_eq!(ie.normalize("087 123 4567").as_deref(), Some("+353871234567"));
    }

    #[test]
    fn phone_number_deserialization_normalizes() {
        let phone: PhoneNumber = serde_json::from_str("\"07700 900123\"").unwrap();
        assert_eq!(phone.as_str(), "+447700900123");
        assert_eq!(phone.digits(), "447700900123");
        assert!(serde_json::from_str::<PhoneNumber>("\"none\"").is_err());
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "[0-9 +()\\-.a-z]{0,20}") {
            let once = normalize(&raw);
            if let Some(ref canonical) = once {
                prop_assert_eq!(normalize(canonical), once.clone());
            }
        }

        #[test]
        fn equal_is_symmetric(a in "[0-9 +]{0,16}", b in "[0-9 +]{0,16}") {
            prop_assert_eq!(equal(&a, &b), equal(&b, &a));
        }
    }
}
