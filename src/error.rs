//! Error types for bunker.
//!
//! Every fallible operation returns [`Result`], whose error is the top-level
//! [`Error`] wrapping one domain error per subsystem.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration resolution errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An intermediate or terminal segment of a dotted path does not exist.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// A mandatory property (looked up without a default) is absent.
    #[error("missing required config property: {path}")]
    Missing { path: String },

    /// A property exists but cannot be converted to the requested type.
    #[error("config property {path} has the wrong type: {source}")]
    Type {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A property exists but is a mapping or sequence where text was expected.
    #[error("config property {path} is not a scalar")]
    NotScalar { path: String },

    /// A config file could not be read or parsed.
    ///
    /// Only ever logged by the loader; kept as an error type so the cause
    /// renders consistently.
    #[error("failed to load config file {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
}

/// Secret-state lifecycle errors.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("state key already exists: {0}")]
    DuplicateKey(String),

    #[error("state key not found: {0}")]
    KeyNotFound(String),

    #[error("unable to save state to secret '{key}' after {attempts} attempt(s): {source}")]
    WriteExhausted {
        key: String,
        attempts: u32,
        #[source]
        source: StoreError,
    },

    #[error("state in secret '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("secret '{key}' exists but could not be read; refusing to overwrite it")]
    Conflict {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid state definition for '{key}': {reason}")]
    InvalidDefinition { key: String, reason: String },
}

/// Remote secret store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("secret already exists: {0}")]
    AlreadyExists(String),

    #[error("secret store request failed: {0}")]
    Backend(String),

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("secret store io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether retrying the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Serialize(_))
    }
}

/// Value generator errors.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("unknown character class: {0}")]
    UnknownClass(String),

    #[error("empty alphabet")]
    EmptyAlphabet,
}

pub type Result<T> = std::result::Result<T, Error>;
