//! Environment variable stage: active environment selection and overrides.

use super::{LoadOptions, normalize_level};
use crate::{AuthConfig, EnvSource, Setting};
use log::{debug, warn};
use serde_json::Value;

/// Resolve the active environment name; first set variable wins.
pub(super) fn active_environment(options: &LoadOptions, env: &dyn EnvSource) -> String {
    if let Some(name) = options.environment.as_deref() {
        debug!("using explicit environment name: {name}");
        return name.to_string();
    }
    for var in &options.environment_vars {
        if let Some(name) = env.var(var) {
            debug!("environment name from {var}: {name}");
            return name;
        }
    }
    debug!(
        "no environment variable set; falling back to {}",
        options.default_environment
    );
    options.default_environment.clone()
}

/// Apply `<prefix>SECRET_KEY`, `<prefix>SESSION_TIMEOUT` and
/// `<prefix>LOG_LEVEL` to `config`, returning the fields that changed.
///
/// A timeout that is not an integer is stored as [`Setting::Malformed`];
/// validation reports it.
pub(super) fn apply_overrides(
    config: &mut AuthConfig,
    options: &LoadOptions,
    env: &dyn EnvSource,
) -> Vec<String> {
    let var_name = |field: &str| format!("{}{}", options.override_prefix, field.to_uppercase());
    let mut applied = Vec::new();

    if let Some(secret_key) = env.var(&var_name("secret_key")) {
        config.secret_key = Some(Setting::Value(secret_key));
        applied.push("secret_key".to_string());
    }

    let timeout_var = var_name("session_timeout");
    if let Some(raw) = env.var(&timeout_var) {
        config.session_timeout = match raw.trim().parse::<i64>() {
            Ok(seconds) => Setting::Value(seconds),
            Err(_) => {
                warn!("{timeout_var} is not an integer: {raw:?}");
                Setting::Malformed(Value::String(raw))
            }
        };
        applied.push("session_timeout".to_string());
    }

    if let Some(raw) = env.var(&var_name("log_level")) {
        config.log_level = normalize_level(&raw);
        applied.push("log_level".to_string());
    }

    debug!("environment overrides applied: {applied:?}");
    applied
}
