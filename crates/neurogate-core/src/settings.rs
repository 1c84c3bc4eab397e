//! User-facing detection settings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SettingsError;

/// How eagerly prompts are flagged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityLevel {
    /// Only strongly corroborated matches are flagged.
    Low,
    /// Balanced default.
    #[default]
    Medium,
    /// Weak signals are flagged too.
    High,
}

impl SensitivityLevel {
    /// Minimum winning confidence required to flag a prompt.
    pub fn threshold(&self) -> f32 {
        match self {
            SensitivityLevel::Low => 0.7,
            SensitivityLevel::Medium => 0.5,
            SensitivityLevel::High => 0.3,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityLevel::Low => "low",
            SensitivityLevel::Medium => "medium",
            SensitivityLevel::High => "high",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(SensitivityLevel::Low),
            "medium" => Some(SensitivityLevel::Medium),
            "high" => Some(SensitivityLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for SensitivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application settings consumed by the analysis orchestrator.
///
/// Missing fields fall back to their defaults when deserializing, so older
/// persisted settings keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Whether typed input is analyzed as it arrives.
    pub enable_real_time_detection: bool,
    /// Flagging threshold.
    pub sensitivity_level: SensitivityLevel,
    /// Whether flagged input should be cleared by the caller.
    pub auto_clear_input: bool,
    /// Whether flagged input should raise an alert.
    pub show_floating_alerts: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            enable_real_time_detection: true,
            sensitivity_level: SensitivityLevel::Medium,
            auto_clear_input: true,
            show_floating_alerts: true,
        }
    }
}

impl AppSettings {
    /// Setting keys accepted by [`AppSettings::set`].
    pub const KEYS: &'static [&'static str] = &[
        "enable_real_time_detection",
        "sensitivity_level",
        "auto_clear_input",
        "show_floating_alerts",
    ];

    /// Sets a single setting from its string form.
    ///
    /// Keys may use `-` or `_`. Settings are left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let key = key.trim().replace('-', "_");
        let invalid = || SettingsError::InvalidValue {
            key: key.clone(),
            value: value.to_string(),
        };
        match key.as_str() {
            "enable_real_time_detection" => {
                self.enable_real_time_detection = parse_bool(value).ok_or_else(invalid)?
            }
            "sensitivity_level" => {
                self.sensitivity_level = SensitivityLevel::parse(value).ok_or_else(invalid)?
            }
            "auto_clear_input" => self.auto_clear_input = parse_bool(value).ok_or_else(invalid)?,
            "show_floating_alerts" => {
                self.show_floating_alerts = parse_bool(value).ok_or_else(invalid)?
            }
            _ => return Err(SettingsError::UnknownKey(key.clone())),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}
