//! Configuration loader: template expansion, YAML parsing, section merge and
//! environment overrides.
//!
//! Stage order for a file load is expand -> parse -> merge `default` with the
//! active environment section -> apply to the entity. Environment overrides
//! are a separate stage (`load_from_env`) that callers run afterwards, or use
//! [`AuthConfig::resolve`] to run both. Validation is never implicit.

mod document;
mod merge;
mod overlay;
mod template;


use crate::validate::type_name;
use crate::{AuthConfig, ConfigError, EnvSource, ModuleSettings, ProcessEnv, Setting};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Section applied regardless of the active environment.
const DEFAULT_SECTION: &str = "default";
/// Environment name used when no selector variable is set.
const DEFAULT_ENVIRONMENT: &str = "development";
/// Variables consulted (in order) for the active environment name.
const DEFAULT_ENVIRONMENT_VARS: &[&str] = &["MODULAR_AUTH_ENV", "RACK_ENV", "RAILS_ENV"];
/// Prefix for per-field override variables.
const DEFAULT_OVERRIDE_PREFIX: &str = "MODULAR_AUTH_";

/// Options controlling environment selection and overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Explicit environment name; skips the selector variables when set.
    pub environment: Option<String>,
    /// Selector variables, highest priority first.
    pub environment_vars: Vec<String>,
    /// Fallback when no selector variable is set.
    pub default_environment: String,
    /// Prefix for `SECRET_KEY`, `SESSION_TIMEOUT` and `LOG_LEVEL` overrides.
    pub override_prefix: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            environment: None,
            environment_vars: DEFAULT_ENVIRONMENT_VARS
                .iter()
                .map(|var| var.to_string())
                .collect(),
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
            override_prefix: DEFAULT_OVERRIDE_PREFIX.to_string(),
        }
    }
}

impl LoadOptions {
    /// Pin the active environment name.
    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Replace the selector variables (highest priority first).
    pub fn with_environment_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environment_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_environment(mut self, name: impl Into<String>) -> Self {
        self.default_environment = name.into();
        self
    }

    pub fn with_override_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.override_prefix = prefix.into();
        self
    }
}

/// What a file load did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Environment section merged over `default`.
    pub environment: String,
    /// Entity fields overwritten by the load.
    pub applied: Vec<String>,
}

impl AuthConfig {
    /// Resolve a config from defaults, the file at `path` and the process
    /// environment. The result is not validated.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::resolve_with(path, &LoadOptions::default(), &ProcessEnv)
    }

    /// Like [`AuthConfig::resolve`] with explicit options and environment.
    pub fn resolve_with(
        path: impl AsRef<Path>,
        options: &LoadOptions,
        env: &dyn EnvSource,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        config.load_from_file_with(path, options, env)?;
        config.load_from_env_with(options, env);
        Ok(config)
    }

    /// Load a file using the process environment and default options.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary, ConfigError> {
        self.load_from_file_with(path, &LoadOptions::default(), &ProcessEnv)
    }

    /// Load a file, overwriting only the fields present in the merged
    /// document. On error the config is left unchanged.
    pub fn load_from_file_with(
        &mut self,
        path: impl AsRef<Path>,
        options: &LoadOptions,
        env: &dyn EnvSource,
    ) -> Result<LoadSummary, ConfigError> {
        let path = path.as_ref();
        info!("loading config from path: {}", path.display());
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        self.load_from_str_with(&contents, options, env)
    }

    /// Load from in-memory text; same semantics as a file load.
    pub fn load_from_str_with(
        &mut self,
        contents: &str,
        options: &LoadOptions,
        env: &dyn EnvSource,
    ) -> Result<LoadSummary, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let expanded = template::expand(contents, env)?;
        let document = document::parse(&expanded)?;

        let environment = overlay::active_environment(options, env);
        let defaults = section(&document, DEFAULT_SECTION)?;
        let overrides = section(&document, &environment)?;
        if overrides.is_none() {
            debug!("no section for environment {environment}; using defaults only");
        }
        let merged = merge::merge_sections(defaults, overrides);

        let mut staged = self.clone();
        let applied = apply_document(&mut staged, merged)?;
        *self = staged;

        info!(
            "config loaded (environment={environment}, applied={})",
            applied.len()
        );
        Ok(LoadSummary {
            environment,
            applied,
        })
    }

    /// Apply override variables from the process environment.
    pub fn load_from_env(&mut self) -> Vec<String> {
        self.load_from_env_with(&LoadOptions::default(), &ProcessEnv)
    }

    /// Apply override variables; returns the fields that changed. Values are
    /// stored as given and checked by [`AuthConfig::validate`].
    pub fn load_from_env_with(&mut self, options: &LoadOptions, env: &dyn EnvSource) -> Vec<String> {
        overlay::apply_overrides(self, options, env)
    }
}

/// Fetch a named top-level section; absent and `null` sections are `None`.
fn section(document: &Map<String, Value>, name: &str) -> Result<Option<Value>, ConfigError> {
    match document.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => Ok(Some(value.clone())),
        Some(_) => Err(document::invalid_document(name, "expected a mapping")),
    }
}

/// Write recognised keys from the merged document into `config`.
fn apply_document(config: &mut AuthConfig, merged: Value) -> Result<Vec<String>, ConfigError> {
    let Value::Object(mut map) = merged else {
        return Err(document::invalid_document("", "expected a mapping"));
    };
    let mut applied = Vec::new();

    if let Some(value) = take_present(&mut map, "secret_key") {
        config.secret_key = Some(match value {
            Value::String(secret) => Setting::Value(secret),
            other => Setting::Malformed(other),
        });
        applied.push("secret_key".to_string());
    }

    if let Some(value) = take_present(&mut map, "session_timeout") {
        config.session_timeout = match integer(&value) {
            Some(seconds) => Setting::Value(seconds),
            None => Setting::Malformed(value),
        };
        applied.push("session_timeout".to_string());
    }

    if let Some(value) = take_present(&mut map, "log_level") {
        let level = match value {
            Value::String(text) => text,
            // Non-text levels keep their JSON rendering so validation names them.
            other => other.to_string(),
        };
        config.log_level = normalize_level(&level);
        applied.push("log_level".to_string());
    }

    match map.remove("modules") {
        Some(Value::Object(entries)) => {
            config.modules = module_settings(entries);
            applied.push("modules".to_string());
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            warn!("ignoring modules: expected a mapping, got {}", type_name(&other));
        }
    }

    if !map.is_empty() {
        let unknown: Vec<&String> = map.keys().collect();
        debug!("ignoring unrecognised keys: {unknown:?}");
    }
    Ok(applied)
}

/// Keep mapping-typed module entries; anything else is dropped.
fn module_settings(entries: Map<String, Value>) -> ModuleSettings {
    entries
        .into_iter()
        .filter_map(|(name, settings)| match settings {
            Value::Object(settings) => Some((name, settings)),
            other => {
                warn!(
                    "discarding module {name}: expected a mapping, got {}",
                    type_name(&other)
                );
                None
            }
        })
        .collect()
}

fn take_present(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    map.remove(key).filter(|value| !value.is_null())
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Lowercase a level name, accepting symbol spelling (`:debug`).
fn normalize_level(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(':')
        .unwrap_or(trimmed)
        .to_lowercase()
}
