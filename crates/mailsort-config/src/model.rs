use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub version: u32,
    pub profile_name: String,
    pub backend: BackendConfig,
    #[serde(default)]
    pub latency: LatencyConfig,
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Mock,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Simulated round-trip times of the in-memory backend, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatencyConfig {
    pub list_ms: u64,
    pub generate_reply_ms: u64,
    pub accept_ms: u64,
    pub decline_ms: u64,
    pub edit_ms: u64,
    pub send_reply_ms: u64,
    pub mark_read_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            list_ms: 500,
            generate_reply_ms: 1000,
            accept_ms: 500,
            decline_ms: 500,
            edit_ms: 800,
            send_reply_ms: 0,
            mark_read_ms: 0,
        }
    }
}

/// Upper bound for `reminder.threshold_hours` (one hundred years).
pub const MAX_THRESHOLD_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub check_interval_secs: u64,
    pub threshold_hours: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 60 * 60,
            threshold_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    pub signature: String,
    /// Fill in a keyword-based suggestion for uncategorized messages at startup.
    pub suggest_missing: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            signature: "Your Name".to_string(),
            suggest_missing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SeedConfig {
    /// JSON file with the messages to start from; the built-in mailbox otherwise.
    pub fixture_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.backend.kind == BackendKind::Http && self.backend.api_base_url.trim().is_empty() {
            return Err(crate::ConfigError::Invalid(
                "backend.api_base_url is required for the http backend".to_string(),
            ));
        }
        if self.reminder.check_interval_secs == 0 {
            return Err(crate::ConfigError::Invalid(
                "reminder.check_interval_secs must be positive".to_string(),
            ));
        }
        if !(0..=MAX_THRESHOLD_HOURS).contains(&self.reminder.threshold_hours) {
            return Err(crate::ConfigError::Invalid(format!(
                "reminder.threshold_hours must be between 0 and {MAX_THRESHOLD_HOURS}"
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            profile_name: "default".to_string(),
            backend: BackendConfig {
                kind: BackendKind::Mock,
                api_base_url: "http://localhost:5000/api".to_string(),
                request_timeout_secs: 10,
            },
            latency: LatencyConfig::default(),
            reminder: ReminderConfig::default(),
            ai: AiConfig::default(),
            seed: SeedConfig::default(),
        }
    }
}
