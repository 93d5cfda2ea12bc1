//! Error types for configuration loading, validation and authentication.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Root error for everything modular-auth reports.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading or validating configuration failed.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    /// Authenticating a caller failed.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
}

/// Errors returned while loading or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("configuration file not found: {}", .path.display())]
    NotFound { path: PathBuf },
    /// Reading a config file failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// An inline `${...}` expression could not be evaluated.
    #[error("template expansion failed at line {line}: {message}")]
    Template { line: usize, message: String },
    /// The expanded text is not valid YAML.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] serde_yaml::Error),
    /// A YAML tag outside the allow-list was used.
    #[error("disallowed tag `{tag}` at {path}")]
    DisallowedTag { tag: String, path: String },
    /// The document parsed but has an unusable shape.
    #[error("invalid config document at {path}: {message}")]
    InvalidDocument { path: String, message: String },
    /// A value is present but malformed.
    #[error("{message}: {context}")]
    Invalid {
        message: String,
        context: ErrorContext,
    },
    /// A required value is absent.
    #[error("{message}: {context}")]
    Missing {
        message: String,
        context: ErrorContext,
    },
}

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// File, template or parse failure; the load was aborted.
    Load,
    /// A value is present but malformed.
    Invalid,
    /// A required value is absent.
    Missing,
}

impl ConfigError {
    /// Build an invalid-configuration error.
    pub fn invalid(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Invalid {
            message: message.into(),
            context,
        }
    }

    /// Build a missing-configuration error.
    pub fn missing(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Missing {
            message: message.into(),
            context,
        }
    }

    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            Self::Invalid { .. } => ConfigErrorKind::Invalid,
            Self::Missing { .. } => ConfigErrorKind::Missing,
            _ => ConfigErrorKind::Load,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.kind() == ConfigErrorKind::Invalid
    }

    pub fn is_missing(&self) -> bool {
        self.kind() == ConfigErrorKind::Missing
    }

    /// Diagnostic payload for classified errors.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Invalid { context, .. } | Self::Missing { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Ordered key/value diagnostics attached to classified config errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    entries: Vec<(String, String)>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a context naming a single field.
    pub fn field(name: &str) -> Self {
        Self::new().with("field", name)
    }

    /// Append an entry, keeping insertion order.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.entries.push((key.into(), value.to_string()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (key, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str("}")
    }
}

/// Errors reserved for authentication modules built on this configuration.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The presented credentials were rejected.
    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },
    /// The session outlived the configured timeout.
    #[error("session expired after {age_secs}s (timeout {timeout_secs}s)")]
    SessionExpired { age_secs: u64, timeout_secs: u64 },
}
