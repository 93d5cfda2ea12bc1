//! Public surface for modular-auth hosts.
//!
//! Re-exports the configuration core and provides the startup helpers a host
//! calls before handing the resolved config to its authentication modules.

/// Re-export for convenience.
pub use modular_auth_config as config;
pub use modular_auth_config::{AuthConfig, ConfigError, Error, LoadOptions, LogLevel};

use modular_auth_config::EnvSource;
use std::path::Path;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}

/// Resolve the config at `path` and validate it.
///
/// This is the startup sequence a host runs once: defaults, file, environment
/// overrides, then validation. The returned config is meant to be shared
/// read-only afterwards.
pub fn load_validated(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    env: &dyn EnvSource,
) -> Result<AuthConfig, ConfigError> {
    let config = AuthConfig::resolve_with(path, options, env)?;
    config.validate()?;
    log::info!(
        "config validated (session_timeout={}, log_level={}, modules={})",
        config.session_timeout().unwrap_or_default(),
        config.log_level,
        config.modules.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_validated_accepts_complete_config() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("modular_auth.yaml");
        fs::write(&path, "default:\n  secret_key: abc\n  log_level: warn\n").expect("write");

        let env = HashMap::<String, String>::new();
        let config = load_validated(&path, &LoadOptions::default(), &env).expect("config");
        assert_eq!(config.level().expect("level"), LogLevel::Warn);
    }

    #[test]
    fn load_validated_rejects_missing_secret() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("modular_auth.yaml");
        fs::write(&path, "default:\n  session_timeout: 60\n").expect("write");

        let env = HashMap::<String, String>::new();
        let err = load_validated(&path, &LoadOptions::default(), &env).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn load_validated_rejects_malformed_timeout_override() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("modular_auth.yaml");
        fs::write(&path, "default:\n  secret_key: abc\n").expect("write");

        let env = HashMap::from([(
            "MODULAR_AUTH_SESSION_TIMEOUT".to_string(),
            "an hour".to_string(),
        )]);
        let err = load_validated(&path, &LoadOptions::default(), &env).unwrap_err();
        assert!(err.is_invalid());
        assert_eq!(
            err.context().and_then(|ctx| ctx.get("field")),
            Some("session_timeout")
        );
    }
}
