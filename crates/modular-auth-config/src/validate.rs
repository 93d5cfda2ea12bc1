//! Post-load validation of the settings entity.

use crate::{AuthConfig, ConfigError, ErrorContext, LogLevel, Setting};
use serde_json::Value;

impl AuthConfig {
    /// Check the loaded settings without modifying them.
    ///
    /// Rules run in a fixed order (secret key, session timeout, log level,
    /// modules) and the first failure is returned, so repeated calls on an
    /// unchanged config always report the same outcome.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.secret_key {
            None => {
                return Err(ConfigError::missing(
                    "secret_key is required",
                    ErrorContext::field("secret_key"),
                ));
            }
            Some(Setting::Malformed(raw)) => {
                return Err(ConfigError::invalid(
                    "secret_key must be a string",
                    ErrorContext::field("secret_key").with("type", type_name(raw)),
                ));
            }
            Some(Setting::Value(secret)) if secret.trim().is_empty() => {
                return Err(ConfigError::missing(
                    "secret_key must not be empty",
                    ErrorContext::field("secret_key").with("length", secret.len()),
                ));
            }
            Some(Setting::Value(_)) => {}
        }

        match &self.session_timeout {
            Setting::Malformed(raw) => {
                return Err(ConfigError::invalid(
                    "session_timeout must be an integer",
                    ErrorContext::field("session_timeout").with("value", raw),
                ));
            }
            Setting::Value(seconds) if *seconds <= 0 => {
                return Err(ConfigError::invalid(
                    "session_timeout must be a positive integer",
                    ErrorContext::field("session_timeout").with("value", seconds),
                ));
            }
            Setting::Value(_) => {}
        }

        self.log_level.parse::<LogLevel>()?;

        if self.modules.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "module names must not be empty",
                ErrorContext::field("modules"),
            ));
        }

        Ok(())
    }

    /// Parsed log level; fails the same way [`AuthConfig::validate`] does.
    pub fn level(&self) -> Result<LogLevel, ConfigError> {
        self.log_level.parse()
    }
}

/// Short type label used in diagnostics.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    fn valid_config() -> AuthConfig {
        AuthConfig::builder().secret_key("s3cr3t").build()
    }

    #[test]
    fn missing_secret_is_reported_as_missing() {
        let config = AuthConfig::new();
        let err = config.validate().unwrap_err();
        assert!(err.is_missing());
        assert_eq!(err.context().and_then(|ctx| ctx.get("field")), Some("secret_key"));
    }

    #[test]
    fn blank_secret_is_reported_as_missing() {
        let mut config = valid_config();
        config.secret_key = Some(Setting::Value("   ".to_string()));
        assert!(config.validate().unwrap_err().is_missing());
    }

    #[test]
    fn valid_config_passes() {
        let config = valid_config();
        config.validate().expect("valid");
        assert_eq!(config, valid_config());
    }

    #[test]
    fn non_positive_timeout_is_invalid() {
        for timeout in [0, -1, i64::MIN] {
            let mut config = valid_config();
            config.session_timeout = Setting::Value(timeout);
            let err = config.validate().unwrap_err();
            assert!(err.is_invalid());
            assert_eq!(
                err.context().and_then(|ctx| ctx.get("value")),
                Some(timeout.to_string().as_str())
            );
        }
    }

    #[test]
    fn malformed_timeout_is_invalid() {
        let mut config = valid_config();
        config.session_timeout = Setting::Malformed(json!(1.5));
        let err = config.validate().unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(err.context().and_then(|ctx| ctx.get("value")), Some("1.5"));
    }

    #[test]
    fn non_string_secret_is_invalid() {
        let mut config = valid_config();
        config.secret_key = Some(Setting::Malformed(json!(31)));
        let err = config.validate().unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(err.context().and_then(|ctx| ctx.get("type")), Some("number"));
    }

    #[test]
    fn unknown_log_level_is_invalid() {
        let mut config = valid_config();
        config.log_level = "trace".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.is_invalid());
        assert!(err.to_string().contains("debug, info, warn, error, fatal"));
    }

    #[test]
    fn every_known_log_level_passes() {
        for level in LogLevel::ALL {
            let config = AuthConfig::builder()
                .secret_key("k")
                .log_level(level)
                .build();
            config.validate().expect("valid");
            assert_eq!(config.level().expect("level"), level);
        }
    }

    #[test]
    fn empty_module_name_is_invalid() {
        let config = AuthConfig::builder()
            .secret_key("k")
            .module("", Map::new())
            .build();
        assert!(config.validate().unwrap_err().is_invalid());
    }

    #[test]
    fn missing_secret_is_reported_before_other_problems() {
        let mut config = AuthConfig::new();
        config.session_timeout = Setting::Value(0);
        config.log_level = "loud".to_string();
        let first = config.validate().unwrap_err();
        let second = config.validate().unwrap_err();
        assert!(first.is_missing());
        assert_eq!(first.to_string(), second.to_string());
    }
}
