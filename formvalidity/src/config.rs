//! Engine configuration.
//!
//! Every knob has a documented default, so `ValidityConfig::default()` is a
//! complete configuration. The same structure can be loaded from JSON.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::error_display::ErrorDisplay;

/// Canonical messages for the built-in checks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Missing value on a required control.
    pub required: String,
    /// `pattern` mismatch when the control has no `title`.
    pub pattern: String,
    pub number: String,
    pub email: String,
    pub url: String,
    pub tel: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            required: "field is required".to_string(),
            pattern: "illegal value format".to_string(),
            number: "should be a numeric value".to_string(),
            email: "should be a valid email".to_string(),
            url: "should be a valid URL".to_string(),
            tel: "should be a valid phone number".to_string(),
        }
    }
}

impl Messages {
    /// Type-mismatch message for a predefined input type.
    pub fn mismatch(&self, input_type: &str) -> Option<&str> {
        match input_type {
            "number" => Some(self.number.as_str()),
            "email" => Some(self.email.as_str()),
            "url" => Some(self.url.as_str()),
            "tel" => Some(self.tel.as_str()),
            _ => None,
        }
    }
}

/// When a field report emits a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyPolicy {
    /// Only on valid -> invalid and invalid -> valid edges.
    #[default]
    OnTransition,
    /// Like `OnTransition`, but a failing report while already invalid
    /// fires `Fail` again (keeps a visible message in sync with the value).
    EveryInvalidCheck,
}

/// How a non-empty override combines with the built-in checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideMode {
    /// Override errors replace computed errors entirely.
    #[default]
    Replace,
    /// Override errors come first, computed errors follow.
    Merge,
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// Tooltip layer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    pub display: ErrorDisplay,
    /// Delay added per tooltip when a submit reveals several at once.
    #[serde(rename = "stagger_ms", deserialize_with = "millis")]
    pub stagger: Duration,
    /// Delay before replacing a tooltip that is already visible.
    #[serde(rename = "refresh_delay_ms", deserialize_with = "millis")]
    pub refresh_delay: Duration,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            display: ErrorDisplay::default(),
            stagger: Duration::from_millis(100),
            refresh_delay: Duration::from_millis(100),
        }
    }
}

/// Configuration for a [`Validation`](crate::Validation) engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidityConfig {
    pub messages: Messages,
    pub notify: NotifyPolicy,
    pub overrides: OverrideMode,
    pub tooltip: TooltipConfig,
}

impl ValidityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn notify(mut self, policy: NotifyPolicy) -> Self {
        self.notify = policy;
        self
    }

    pub fn overrides(mut self, mode: OverrideMode) -> Self {
        self.overrides = mode;
        self
    }

    pub fn error_display(mut self, display: ErrorDisplay) -> Self {
        self.tooltip.display = display;
        self
    }

    pub fn stagger(mut self, stagger: Duration) -> Self {
        self.tooltip.stagger = stagger;
        self
    }
}
