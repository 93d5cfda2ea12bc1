//! Inline `${...}` expansion applied to raw config text before parsing.
//!
//! Only environment lookups are supported:
//!
//! - `${NAME}` expands to the value of `NAME`, or to nothing when it is unset.
//! - `${NAME:-fallback}` expands to `fallback` when `NAME` is unset.
//! - `${NAME:?message}` fails the load with `message` when `NAME` is unset.
//!   The whole file is expanded, whatever section ends up active.
//! - `$${` is an escape for a literal `${`.
//!
//! Expansion is textual and happens before YAML parsing, so a value holding
//! `#` or `: ` must be quoted in the file: `secret_key: "${AUTH_SECRET}"`.
//!
//! Config files are trusted input. Expansion can read any variable visible
//! to the process, so a file must never come from a user-supplied path.

use crate::{ConfigError, EnvSource};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

/// Escape, complete expression, or a dangling `${` with no closing brace.
static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$\{|\$\{([^}\n]*)\}|\$\{").expect("valid expression regex")
});

/// Expand every expression in `text`, or fail without partial output.
pub(super) fn expand(text: &str, env: &dyn EnvSource) -> Result<String, ConfigError> {
    let pattern = &*EXPRESSION;
    let mut output = String::with_capacity(text.len());
    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let mut cursor = 0;
        for captures in pattern.captures_iter(line) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            output.push_str(&line[cursor..whole.start()]);
            cursor = whole.end();

            if whole.as_str() == "$${" {
                output.push_str("${");
                continue;
            }
            let Some(body) = captures.get(1) else {
                return Err(template_error(line_no, "unterminated `${` expression"));
            };
            output.push_str(&evaluate(body.as_str(), env, line_no)?);
        }
        output.push_str(&line[cursor..]);
    }
    Ok(output)
}

/// Evaluate one expression body (`NAME`, `NAME:-fallback` or `NAME:?message`).
fn evaluate(body: &str, env: &dyn EnvSource, line: usize) -> Result<String, ConfigError> {
    let (name, modifier) = match body.split_once(':') {
        Some((name, rest)) => (name.trim(), Some(rest)),
        None => (body.trim(), None),
    };
    if !is_variable_name(name) {
        return Err(template_error(
            line,
            format!("`{name}` is not an environment variable name"),
        ));
    }

    let value = env.var(name);
    match modifier {
        None => Ok(value.unwrap_or_else(|| {
            debug!("line {line}: `{name}` is not set; expanding to an empty string");
            String::new()
        })),
        Some(rest) => {
            if let Some(fallback) = rest.strip_prefix('-') {
                Ok(value.unwrap_or_else(|| fallback.to_string()))
            } else if let Some(message) = rest.strip_prefix('?') {
                value.ok_or_else(|| {
                    let message = message.trim();
                    if message.is_empty() {
                        template_error(line, format!("environment variable `{name}` is not set"))
                    } else {
                        template_error(line, format!("`{name}`: {message}"))
                    }
                })
            } else {
                Err(template_error(
                    line,
                    format!("unsupported modifier `:{rest}` for `{name}`"),
                ))
            }
        }
    }
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn template_error(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::Template {
        line,
        message: message.into(),
    }
}
