//! Bunker - layered deploy configuration and idempotent secret state.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── bootstrap     # environment → config → secret state
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── config/       # Layered configuration
//!     │   ├── node      # Config tree with deferred values
//!     │   ├── path      # Dotted path resolution
//!     │   ├── merge     # Right-biased deep merge
//!     │   ├── interpolate # ${a.b} expansion
//!     │   └── loader    # YAML / TOML / JSON files
//!     ├── environment   # Environment name and config file list
//!     ├── generator/    # Password and app-key generators
//!     ├── retry         # Fixed-delay retry
//!     ├── store/        # Secret storage backends
//!     │   ├── mod       # SecretStore trait
//!     │   ├── memory    # In-process store
//!     │   ├── fs        # JSON files on disk
//!     │   └── aws       # AWS Secrets Manager (feature "aws")
//!     └── state/        # Load-or-create secret state
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bunker::{AppKeyGenerator, ConfigStore, MemoryStore, SecretState};
//!
//! # async fn run() -> bunker::error::Result<()> {
//! let config = ConfigStore::builder()
//!     .root("config")
//!     .files(["config.yaml", "env/dev.yaml"])
//!     .load();
//!
//! let state = SecretState::builder(config.get_str("app.context.key")?, Arc::new(MemoryStore::new()))
//!     .value("APP_KEY", AppKeyGenerator::default())
//!     .initialize()
//!     .await?;
//!
//! let reference = state.secret_reference("APP_KEY")?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::config::{ConfigStore, Node};
pub use crate::core::environment::Environment;
pub use crate::core::generator::{AppKeyGenerator, CharClass, Generator, PasswordGenerator};
pub use crate::core::retry::RetryPolicy;
pub use crate::core::state::{Provenance, SecretRef, SecretState, StateValue};
pub use crate::core::store::{Backend, FileStore, MemoryStore, SecretStore};
pub use crate::error::{Error, Result};
