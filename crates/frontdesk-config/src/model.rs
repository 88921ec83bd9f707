// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is a
//! startup error rather than a silently ignored setting.

use serde::{Deserialize, Serialize};

/// Top-level frontdesk configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FrontdeskConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    /// Business identity: persona, staff, closure notice.
    #[serde(default)]
    pub business: BusinessConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    /// Conversation-mode state machine timings.
    #[serde(default)]
    pub mode: ModeConfig,

    #[serde(default)]
    pub batching: BatchingConfig,

    /// Inbound trigger throttling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Staff notification settings.
    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub missed_call: MissedCallConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process-level settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "frontdesk".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Who the business is and who speaks for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessConfig {
    #[serde(default = "default_business_name")]
    pub name: String,

    /// Closing signature of the automated persona, e.g. "AI Steve".
    #[serde(default = "default_persona_signature")]
    pub persona_signature: String,

    /// First names staff sign messages with. Never read as customer names.
    #[serde(default = "default_staff_names")]
    pub staff_names: Vec<String>,

    /// Free-text special notice; closure wording activates holiday mode.
    #[serde(default)]
    pub special_notice: Option<String>,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: default_business_name(),
            persona_signature: default_persona_signature(),
            staff_names: default_staff_names(),
            special_notice: None,
        }
    }
}

fn default_business_name() -> String {
    "Frontdesk".to_string()
}

fn default_persona_signature() -> String {
    "AI Steve".to_string()
}

fn default_staff_names() -> Vec<String> {
    vec!["John".to_string()]
}

/// Phone identity rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Country code assumed for national-format numbers (digits, no `+`).
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            default_country_code: default_country_code(),
        }
    }
}

fn default_country_code() -> String {
    "44".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModeConfig {
    /// Minutes after the last staff message before automation resumes.
    #[serde(default = "default_staff_cooldown_minutes")]
    pub staff_cooldown_minutes: i64,

    /// Interval of the stale-manual sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            staff_cooldown_minutes: default_staff_cooldown_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_staff_cooldown_minutes() -> i64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    300
}

/// Debounce of rapid customer messages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BatchingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: default_window_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_window_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// How often expired windows are evicted.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_missed_call_window_secs")]
    pub missed_call_window_secs: u64,

    /// Missed-call triggers admitted per caller per window.
    #[serde(default = "default_missed_call_max")]
    pub missed_call_max: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            missed_call_window_secs: default_missed_call_window_secs(),
            missed_call_max: default_missed_call_max(),
        }
    }
}

fn default_missed_call_window_secs() -> u64 {
    300
}

fn default_missed_call_max() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Staff numbers that receive alerts. Empty disables delivery.
    #[serde(default)]
    pub notify_to: Vec<String>,

    /// Transport channel used for alerts.
    #[serde(default = "default_escalation_channel")]
    pub channel: String,

    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes: i64,

    #[serde(default = "default_high_priority_cooldown_minutes")]
    pub high_priority_cooldown_minutes: i64,

    /// Generator confidence (0-100) below which a reply also escalates.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,

    /// Linked from alert bodies when set.
    #[serde(default)]
    pub dashboard_url: Option<String>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            notify_to: Vec::new(),
            channel: default_escalation_channel(),
            cooldown_minutes: default_cooldown_minutes(),
            high_priority_cooldown_minutes: default_high_priority_cooldown_minutes(),
            confidence_threshold: default_confidence_threshold(),
            dashboard_url: None,
        }
    }
}

fn default_escalation_channel() -> String {
    "sms".to_string()
}

fn default_cooldown_minutes() -> i64 {
    15
}

fn default_high_priority_cooldown_minutes() -> i64 {
    5
}

fn default_confidence_threshold() -> u8 {
    70
}

/// Auto-text sent when a call goes unanswered.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MissedCallConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_missed_call_template")]
    pub template: String,
}

impl Default for MissedCallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            template: default_missed_call_template(),
        }
    }
}

fn default_missed_call_template() -> String {
    "Sorry we missed your call! Reply here and we'll get back to you as soon as we can."
        .to_string()
}

/// SQLite store settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("frontdesk").join("frontdesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("frontdesk.db"))
        .to_string_lossy()
        .into_owned()
}
