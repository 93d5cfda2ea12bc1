//! Settings model for modular-auth.

use crate::{ConfigError, ErrorContext};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default session lifetime in seconds.
pub const DEFAULT_SESSION_TIMEOUT: i64 = 3600;

/// Placeholder shown instead of the secret key.
pub const REDACTED: &str = "[REDACTED]";

/// Opaque per-module settings, keyed by module name.
pub type ModuleSettings = BTreeMap<String, Map<String, Value>>;

/// Resolved authentication settings.
///
/// Fields are plain data; nothing is checked on write. Values of the wrong
/// shape are kept as [`Setting::Malformed`] so that [`AuthConfig::validate`]
/// can report them once loading is finished.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub secret_key: Option<Setting<String>>,
    #[serde(default = "default_session_timeout")]
    pub session_timeout: Setting<i64>,
    /// Lowercased level name; membership in [`LogLevel`] is checked by validation.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub modules: ModuleSettings,
}

/// A loaded setting: either a well-typed value or the raw input that did
/// not fit the field's type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Setting<T> {
    Value(T),
    Malformed(Value),
}

impl<T> Setting<T> {
    /// The typed value, if the input was well formed.
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Value(value) => Some(value),
            Setting::Malformed(_) => None,
        }
    }

    /// The raw input, if it did not fit the field's type.
    pub fn malformed(&self) -> Option<&Value> {
        match self {
            Setting::Value(_) => None,
            Setting::Malformed(raw) => Some(raw),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Setting::Malformed(_))
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Value(value)
    }
}

fn default_session_timeout() -> Setting<i64> {
    Setting::Value(DEFAULT_SESSION_TIMEOUT)
}

fn default_log_level() -> String {
    LogLevel::default().as_str().to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            session_timeout: default_session_timeout(),
            log_level: default_log_level(),
            modules: ModuleSettings::new(),
        }
    }
}

impl AuthConfig {
    /// Create a config holding the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::new()
    }

    /// Well-formed secret key, if one is set.
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key
            .as_ref()
            .and_then(Setting::value)
            .map(String::as_str)
    }

    /// Well-formed session timeout in seconds.
    pub fn session_timeout(&self) -> Option<i64> {
        self.session_timeout.value().copied()
    }

    /// Settings for a single module, if configured.
    pub fn module(&self, name: &str) -> Option<&Map<String, Value>> {
        self.modules.get(name)
    }

    /// Copy of this config with the secret key masked.
    pub fn redacted(&self) -> Self {
        Self {
            secret_key: self
                .secret_key
                .as_ref()
                .map(|_| Setting::Value(REDACTED.to_string())),
            ..self.clone()
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| REDACTED))
            .field("session_timeout", &self.session_timeout)
            .field("log_level", &self.log_level)
            .field("modules", &self.modules)
            .finish()
    }
}

/// Builder for assembling an `AuthConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl AuthConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: AuthConfig::default(),
        }
    }

    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.config.secret_key = Some(Setting::Value(secret_key.into()));
        self
    }

    pub fn session_timeout(mut self, seconds: i64) -> Self {
        self.config.session_timeout = Setting::Value(seconds);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level.as_str().to_string();
        self
    }

    /// Add or replace the settings for one module.
    pub fn module(mut self, name: impl Into<String>, settings: Map<String, Value>) -> Self {
        self.config.modules.insert(name.into(), settings);
        self
    }

    /// Finalize and return the built `AuthConfig`.
    pub fn build(self) -> AuthConfig {
        self.config
    }
}

/// Accepted values for `log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Closest `log` filter; `log` has no fatal level.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error | LogLevel::Fatal => log::LevelFilter::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let allowed = LogLevel::ALL.map(LogLevel::as_str).join(", ");
                ConfigError::invalid(
                    format!("log_level must be one of: {allowed}"),
                    ErrorContext::field("log_level").with("value", value),
                )
            })
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.to_level_filter()
    }
}
