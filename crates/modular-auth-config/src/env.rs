//! Environment variable access for templating and overrides.

use std::collections::HashMap;

/// Read-only view of environment variables.
///
/// [`EnvSource::var`] reports empty values as unset. This applies everywhere
/// the loader reads the environment: `export MODULAR_AUTH_SECRET_KEY=` does
/// not override the file, an empty `MODULAR_AUTH_ENV` falls through to the
/// next selector, and `${NAME:-fallback}` uses the fallback. Shells that
/// distinguish unset from empty see both as unset here; implement
/// [`EnvSource::lookup`] alone when the raw value is needed.
pub trait EnvSource {
    /// Raw lookup; implementors return whatever the backing store holds.
    fn lookup(&self, name: &str) -> Option<String>;

    /// Lookup that treats empty values as unset.
    fn var(&self, name: &str) -> Option<String> {
        self.lookup(name).filter(|value| !value.is_empty())
    }
}

/// The current process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}
