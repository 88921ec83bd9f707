// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-based layered loading.
//!
//! Merge order, later wins: compiled defaults, `/etc/frontdesk/frontdesk.toml`,
//! `~/.config/frontdesk/frontdesk.toml`, `./frontdesk.toml`, `FRONTDESK_*`.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FrontdeskConfig;

/// Sections that may be targeted by environment variables.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "business",
    "identity",
    "mode",
    "batching",
    "rate_limit",
    "escalation",
    "missed_call",
    "storage",
];

/// Config file locations in merge order (lowest precedence first).
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/frontdesk/frontdesk.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("frontdesk/frontdesk.toml"));
    }
    paths.push(PathBuf::from("frontdesk.toml"));
    paths
}

/// Build the full layered Figment (exposed for diagnostics).
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(FrontdeskConfig::default()));
    for path in config_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Load configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<FrontdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<FrontdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FrontdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one file with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<FrontdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FrontdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// `FRONTDESK_ESCALATION_COOLDOWN_MINUTES` maps to `escalation.cooldown_minutes`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that themselves contain underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("FRONTDESK_").map(|key| {
        let key_str = key.as_str();
        // Longest section names first so `rate_limit_` wins over a shorter match.
        let mut sections: Vec<&str> = ENV_SECTIONS.to_vec();
        sections.sort_by_key(|s| std::cmp::Reverse(s.len()));
        for section in sections {
            let prefix = format!("{section}_");
            if let Some(rest) = key_str.strip_prefix(&prefix) {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.to_string().into()
    })
}
