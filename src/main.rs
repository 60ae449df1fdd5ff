//! Bunker - layered deploy configuration and idempotent secret state.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bunker::cli::output;
use bunker::cli::{execute, Cli};
use bunker::core::constants;
use bunker::error::{ConfigError, Error, StateError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(constants::LOG_ENV_VAR).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("bunker=debug")
        } else {
            EnvFilter::new("bunker=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .init();

    if let Err(e) = execute(cli) {
        let error_msg = e.to_string();
        let suggestion = match &e {
            Error::Config(ConfigError::Missing { path }) if path == constants::STATE_KEY_PATH => {
                Some("set app.context.key in config.yaml")
            }
            Error::State(StateError::WriteExhausted { .. }) => {
                Some("check the secret store is reachable and writable, then re-run")
            }
            Error::State(StateError::Conflict { .. } | StateError::Corrupt { .. }) => {
                Some("inspect the persisted secret; bunker will not overwrite it")
            }
            _ => None,
        };

        output::error(&error_msg);
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
