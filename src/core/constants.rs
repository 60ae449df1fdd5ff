//! Constants used throughout bunker.
//!
//! Centralizes magic strings and default values.

use std::time::Duration;

/// Base configuration file, always loaded first.
pub const BASE_CONFIG_FILE: &str = "config.yaml";

/// Directory (relative to the config root) holding per-environment overrides.
pub const ENV_CONFIG_DIR: &str = "env";

/// Default config root relative to the working directory.
pub const CONFIG_ROOT: &str = "config";

/// Environment name used when neither `--env` nor `ENVIRONMENT` is set.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Prefix of ephemeral pull-request environments (`pr-123`).
pub const PR_ENVIRONMENT_PREFIX: &str = "pr-";

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Environment variable overriding the per-environment config file.
pub const ENV_CONFIG_FILE_VAR: &str = "ENV_CONFIG_FILE";

/// Environment variable listing extra config files, comma-separated.
pub const ADDITIONAL_CONFIG_FILES_VAR: &str = "ADDITIONAL_CONFIG_FILES";

/// Config path holding the secret store key.
pub const STATE_KEY_PATH: &str = "app.context.key";

/// Config path holding the secret definitions.
pub const STATE_SECRETS_PATH: &str = "state.secrets";

/// Config path holding the secret store backend selection.
pub const STATE_BACKEND_PATH: &str = "state.backend";

/// Directory used by the file backend when none is configured.
pub const STATE_DIR: &str = ".bunker/state";

/// Prefix of generated application keys.
pub const APP_KEY_PREFIX: &str = "base64:";

/// Default application key length in bytes.
pub const APP_KEY_LENGTH: usize = 32;

/// Default password length in characters.
pub const PASSWORD_LENGTH: usize = 32;

/// Retries after the first failed read of the secret store.
pub const READ_RETRIES: u32 = 1;

/// Delay between secret store reads.
pub const READ_DELAY: Duration = Duration::from_secs(2);

/// Retries after the first failed write to the secret store.
pub const WRITE_RETRIES: u32 = 5;

/// Delay between secret store writes.
pub const WRITE_DELAY: Duration = Duration::from_secs(5);

/// Log filter environment variable.
pub const LOG_ENV_VAR: &str = "BUNKER_LOG";
