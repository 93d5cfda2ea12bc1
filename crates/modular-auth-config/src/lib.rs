//! Layered configuration resolution for modular-auth.
//!
//! A settings file is expanded (`${VAR}` substitution), parsed as YAML,
//! the `default` section is deep-merged with the active environment section,
//! and process environment overrides are applied last. Validation runs only
//! when the caller asks for it.

mod env;
mod error;
mod loader;
mod model;
mod validate;

/// Environment access used by templating and overrides.
pub use env::{EnvSource, ProcessEnv};
/// Error taxonomy shared with authentication collaborators.
pub use error::{AuthenticationError, ConfigError, ConfigErrorKind, Error, ErrorContext};
/// Loader options and the summary returned by a file load.
pub use loader::{LoadOptions, LoadSummary};
/// Configuration entity and its builder.
pub use model::*;
