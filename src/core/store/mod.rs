//! Remote secret storage.
//!
//! A [`SecretStore`] holds whole state records as JSON strings, one per
//! store key. Bunker only needs to read a record, overwrite it, and create
//! it the first time.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `vault.rs`, `ssm.rs`)
//! 3. Add a `Backend` variant and re-export from this module
//!
//! ## Example
//!
//! ```ignore
//! #[derive(Debug)]
//! struct Vault { /* ... */ }
//!
//! #[async_trait]
//! impl SecretStore for Vault {
//!     fn name(&self) -> &'static str {
//!         "vault"
//!     }
//!     async fn get_value(&self, key: &str) -> Result<String, StoreError> {
//!         // Read the record
//!     }
//!     async fn put_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
//!         // Overwrite the record
//!     }
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::core::constants;
use crate::error::{Result, StoreError};

mod fs;
mod memory;

#[cfg(feature = "aws")]
pub mod aws;

pub use fs::FileStore;
pub use memory::MemoryStore;

/// Secret storage trait.
///
/// Errors are returned as-is; retrying is the caller's concern.
#[async_trait]
pub trait SecretStore: Send + Sync + fmt::Debug {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Read the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record exists.
    async fn get_value(&self, key: &str) -> std::result::Result<String, StoreError>;

    /// Overwrite the record stored under `key`.
    async fn put_value(&self, key: &str, value: &str) -> std::result::Result<(), StoreError>;

    /// Store the first record under `key`.
    ///
    /// Defaults to `put_value`. Backends that distinguish creation return
    /// `StoreError::AlreadyExists` when a record is already there.
    async fn create_value(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        self.put_value(key, value).await
    }
}

/// Backend selection, read from the `state.backend` config section:
///
/// ```yaml
/// state:
///   backend:
///     kind: file
///     dir: .bunker/state
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Backend {
    /// AWS Secrets Manager (requires the `aws` feature).
    Aws {
        #[serde(default)]
        region: Option<String>,
    },
    /// JSON files in a local directory.
    File {
        #[serde(default = "default_state_dir")]
        dir: PathBuf,
    },
    /// Process memory; nothing survives the run.
    Memory,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(constants::STATE_DIR)
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "aws") {
            Self::Aws { region: None }
        } else {
            Self::File {
                dir: default_state_dir(),
            }
        }
    }
}

impl Backend {
    /// Build the configured store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` when the AWS backend is selected in a
    /// build without the `aws` feature.
    pub async fn connect(&self) -> Result<Arc<dyn SecretStore>> {
        let store: Arc<dyn SecretStore> = match self {
            #[cfg(feature = "aws")]
            Self::Aws { region } => Arc::new(aws::AwsSecretsManager::from_env(region.clone()).await),
            #[cfg(not(feature = "aws"))]
            Self::Aws { .. } => {
                return Err(StoreError::Backend(
                    "the aws backend requires building with `--features aws`".to_string(),
                )
                .into())
            }
            Self::File { dir } => Arc::new(FileStore::new(dir.clone())),
            Self::Memory => Arc::new(MemoryStore::new()),
        };

        info!(backend = store.name(), "using secret store");
        Ok(store)
    }
}
