//! Command-line interface.

pub mod bootstrap;
pub mod output;

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::core::constants;
use crate::core::environment::Environment;
use crate::core::state::{Provenance, SecretRef};
use crate::error::{ConfigError, Result, StoreError};

/// Bunker - layered deploy configuration and idempotent secret state.
#[derive(Parser)]
#[command(
    name = "bunker",
    about = "Layered deploy configuration and idempotent secret state",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Environment to deploy (overrides $ENVIRONMENT)
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// Directory holding config.yaml and env/
    #[arg(long, global = true, default_value = constants::CONFIG_ROOT)]
    pub config_root: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Load or create the secret state and print a summary (default)
    Bootstrap {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the resolved config, or one property of it
    Config {
        /// Dotted property path (e.g., app.context.key)
        path: Option<String>,
    },
}

/// Execute a command.
///
/// # Errors
///
/// Returns error if the command execution fails.
pub fn execute(cli: Cli) -> Result<()> {
    let environment = Environment::from_process(cli.env.as_deref());

    match cli.command.unwrap_or(Command::Bootstrap { json: false }) {
        Command::Bootstrap { json } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let provisioned = runtime.block_on(bootstrap::run(environment, &cli.config_root))?;
            if json {
                print_json(&provisioned)
            } else {
                print_summary(&provisioned);
                Ok(())
            }
        }
        Command::Config { path } => {
            let config = bootstrap::load_config(&environment, &cli.config_root);
            let path = path.unwrap_or_default();
            let value = if path.is_empty() {
                config.tree().force()
            } else {
                config.get(&path)?
            };
            let yaml = serde_yaml::to_string(&value).map_err(|source| ConfigError::Type { path, source })?;
            print!("{}", yaml);
            Ok(())
        }
    }
}

fn print_summary(provisioned: &bootstrap::Provisioned) {
    let state = &provisioned.state;

    match state.provenance() {
        Provenance::Created => output::success("secret state created"),
        Provenance::Loaded => output::success("secret state loaded"),
    }

    output::section("Secret state");
    output::kv("environment", provisioned.environment.name());
    output::kv("store key", state.key());
    output::kv("provenance", state.provenance());
    output::kv("fingerprint", &state.fingerprint()[..12]);

    output::section("References");
    for (name, reference) in state.references() {
        println!("  {}  {}", output::key(&name), output::dim(reference));
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    environment: &'a str,
    key: &'a str,
    provenance: String,
    fingerprint: String,
    references: BTreeMap<String, String>,
}

fn print_json(provisioned: &bootstrap::Provisioned) -> Result<()> {
    let state = &provisioned.state;
    let summary = Summary {
        environment: provisioned.environment.name(),
        key: state.key(),
        provenance: state.provenance().to_string(),
        fingerprint: state.fingerprint(),
        references: state.map_secrets(|reference: SecretRef| reference.to_string()),
    };
    let json = serde_json::to_string_pretty(&summary).map_err(StoreError::from)?;
    println!("{}", json);
    Ok(())
}
