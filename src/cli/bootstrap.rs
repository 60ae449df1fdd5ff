//! Bootstrap sequence: environment, then config, then secret state.

use std::path::Path;

use tracing::debug;

use crate::core::config::ConfigStore;
use crate::core::constants;
use crate::core::environment::Environment;
use crate::core::state::{self, SecretState};
use crate::core::store::Backend;
use crate::error::Result;

/// Everything downstream deployment code needs, built once per process.
#[derive(Debug)]
pub struct Provisioned {
    pub environment: Environment,
    pub config: ConfigStore,
    pub state: SecretState,
}

/// Load the layered config for `environment` from `config_root`.
///
/// The environment name is seeded as the `env` property, so config files
/// can refer to it as `${env}`.
pub fn load_config(environment: &Environment, config_root: &Path) -> ConfigStore {
    ConfigStore::builder()
        .root(config_root)
        .property("env", environment.name())
        .files(environment.config_files())
        .load()
}

/// Provision secret state as configured by `config`.
///
/// # Errors
///
/// Fails if `app.context.key` is missing, the backend or secret
/// definitions are invalid, or the state cannot be saved.
pub async fn provision_state(config: &ConfigStore) -> Result<SecretState> {
    let key = config.get_str(constants::STATE_KEY_PATH)?;
    let backend: Backend = config.get_as_or(constants::STATE_BACKEND_PATH, Backend::default())?;
    let definitions = match config.get_opt(constants::STATE_SECRETS_PATH) {
        Some(section) => state::parse_definitions(section)?,
        None => state::default_definitions(),
    };
    debug!(key = %key, ?backend, definitions = definitions.len(), "provisioning secret state");

    let store = backend.connect().await?;
    SecretState::builder(key, store)
        .values(definitions)
        .initialize()
        .await
}

/// Run the whole sequence.
///
/// # Errors
///
/// See [`provision_state`].
pub async fn run(environment: Environment, config_root: &Path) -> Result<Provisioned> {
    let config = load_config(&environment, config_root);
    let state = provision_state(&config).await?;

    Ok(Provisioned {
        environment,
        config,
        state,
    })
}
