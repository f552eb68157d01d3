// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const ENV_PATH: &str = "NEWSHUB_CONFIG_PATH";
const DEFAULT_TOML_PATH: &str = "config/newshub.toml";
const DEFAULT_JSON_PATH: &str = "config/newshub.json";

/// Tunables for the fetch/cache/personalization core. Every field has a
/// serde default so partial config files only override what they name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientConfig {
    /// Per-attempt request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed delay before each retry (no exponential back-off).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Cache entries younger than this are served without a network call.
    #[serde(default = "default_cache_max_age_ms")]
    pub cache_max_age_ms: u64,
    /// Periodic background refresh cadence, independent of freshness.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Retained view events; oldest evicted first past the cap.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

fn default_timeout_ms() -> u64 {
    10_000
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    1_000
}
fn default_cache_max_age_ms() -> u64 {
    30_000
}
fn default_refresh_interval_ms() -> u64 {
    60_000
}
fn default_history_cap() -> usize {
    500
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            cache_max_age_ms: default_cache_max_age_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
            history_cap: default_history_cap(),
        }
    }
}

impl ClientConfig {
    /// Load from an explicit path. Supports TOML or JSON by extension,
    /// trying the other format as fallback. Falls back to defaults on any
    /// error; a broken config file must not take down the news views.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "config unreadable, using defaults");
                return Self::default();
            }
        };
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match parse_config(&content, &ext) {
            Some(cfg) => cfg,
            None => {
                tracing::warn!(path = %path.display(), "config unparsable, using defaults");
                Self::default()
            }
        }
    }

    /// Load using env var + fallbacks:
    /// 1) $NEWSHUB_CONFIG_PATH
    /// 2) config/newshub.toml
    /// 3) config/newshub.json
    /// 4) built-in defaults
    pub fn load_default() -> Self {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
        }
        let toml_p = PathBuf::from(DEFAULT_TOML_PATH);
        if toml_p.exists() {
            return Self::load_from_file(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_JSON_PATH);
        if json_p.exists() {
            return Self::load_from_file(&json_p);
        }
        Self::default()
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Option<ClientConfig> {
    if hint_ext == "json" {
        if let Ok(cfg) = serde_json::from_str(s) {
            return Some(cfg);
        }
    }
    if let Ok(cfg) = toml::from_str(s) {
        return Some(cfg);
    }
    serde_json::from_str(s).ok()
}
