//! Command-line checker for modular-auth configuration files.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::debug;
use modular_auth::LoadOptions;
use modular_auth::config::ProcessEnv;
use std::path::PathBuf;

/// Command-line options for the config checker.
#[derive(Parser)]
#[command(name = "modular-auth", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and validate a config file, then print it with the secret masked
    Check {
        /// Path to the YAML config file
        path: PathBuf,
        /// Environment section to merge over `default`
        #[arg(long)]
        env: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    modular_auth::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Check { path, env } => {
            let mut options = LoadOptions::default();
            if let Some(env) = env {
                options = options.with_environment(env);
            }
            debug!("checking config (path={}, options={options:?})", path.display());
            let config = modular_auth::load_validated(&path, &options, &ProcessEnv)
                .with_context(|| format!("invalid config {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }
    Ok(())
}
