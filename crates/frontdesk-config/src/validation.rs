// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use frontdesk_core::PhoneNormalizer;

use crate::diagnostic::ConfigError;
use crate::model::FrontdeskConfig;

/// Validate a deserialized configuration, collecting every problem.
pub fn validate_config(config: &FrontdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if !(1..=60_000).contains(&config.batching.window_ms) {
        fail(format!(
            "batching.window_ms must be between 1 and 60000, got {}",
            config.batching.window_ms
        ));
    }

    if config.mode.staff_cooldown_minutes <= 0 {
        fail(format!(
            "mode.staff_cooldown_minutes must be positive, got {}",
            config.mode.staff_cooldown_minutes
        ));
    }
    if config.mode.sweep_interval_secs == 0 {
        fail("mode.sweep_interval_secs must be positive".to_string());
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        fail("rate_limit.sweep_interval_secs must be positive".to_string());
    }
    if config.rate_limit.missed_call_window_secs == 0 {
        fail("rate_limit.missed_call_window_secs must be positive".to_string());
    }
    if config.rate_limit.missed_call_max == 0 {
        fail("rate_limit.missed_call_max must be at least 1".to_string());
    }

    let escalation = &config.escalation;
    if escalation.cooldown_minutes <= 0 {
        fail(format!(
            "escalation.cooldown_minutes must be positive, got {}",
            escalation.cooldown_minutes
        ));
    }
    if escalation.high_priority_cooldown_minutes <= 0 {
        fail(format!(
            "escalation.high_priority_cooldown_minutes must be positive, got {}",
            escalation.high_priority_cooldown_minutes
        ));
    }
    if escalation.confidence_threshold > 100 {
        fail(format!(
            "escalation.confidence_threshold must be 0-100, got {}",
            escalation.confidence_threshold
        ));
    }

    let code = &config.identity.default_country_code;
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        fail(format!(
            "identity.default_country_code must be digits only, got `{code}`"
        ));
    }

    let normalizer = PhoneNormalizer::new(code.as_str());
    for (i, number) in escalation.notify_to.iter().enumerate() {
        if normalizer.normalize(number).is_none() {
            fail(format!(
                "escalation.notify_to[{i}] `{number}` is not a phone number"
            ));
        }
    }

    if config.business.persona_signature.trim().is_empty() {
        fail("business.persona_signature must not be empty".to_string());
    }
    for (i, name) in config.business.staff_names.iter().enumerate() {
        if name.trim().is_empty() {
            fail(format!("business.staff_names[{i}] must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&FrontdeskConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails() {
        let mut config = FrontdeskConfig::default();
        config.storage.database_path = " ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database_path"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = FrontdeskConfig::default();
        config.batching.window_ms = 0;
        config.escalation.confidence_threshold = 150;
        config.identity.default_country_code = "+4x".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(has_message(&errors, "window_ms"));
        assert!(has_message(&errors, "confidence_threshold"));
        assert!(has_message(&errors, "default_country_code"));
    }

    #[test]
    fn unparseable_alert_number_fails() {
        let mut config = FrontdeskConfig::default();
        config.escalation.notify_to = vec!["07700 900123".into(), "front desk".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_message(&errors, "notify_to[1]"));
    }

    #[test]
    fn sections_from_toml_validate() {
        let toml_str = r#"
            [mode]
            staff_cooldown_minutes = 45

            [escalation]
            notify_to = ["+44 7700 900999"]
            cooldown_minutes = 0
        "#;
        let config: FrontdeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mode.staff_cooldown_minutes, 45);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(has_message(&errors, "cooldown_minutes"));
    }
}
