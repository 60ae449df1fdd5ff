//! Layered configuration.
//!
//! A [`ConfigStore`] is built from a seed of programmatic properties plus an
//! ordered list of config files. Files are deep-merged over the seed in
//! order, then `${...}` placeholders are expanded twice: once against the
//! process environment, once against the merged tree itself.
//!
//! ```ignore
//! let config = ConfigStore::builder()
//!     .root("config")
//!     .property("env", "staging")
//!     .files(["config.yaml", "env/staging.yaml"])
//!     .load();
//!
//! let key: String = config.get_as("app.context.key")?;
//! let replicas: u32 = config.get_as_or("web.replicas", 2)?;
//! ```

pub mod interpolate;
pub mod loader;
pub mod merge;
pub mod node;
pub mod path;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::core::constants;
use crate::error::{ConfigError, Result};

pub use node::{Deferred, Mapping, Node};

/// Builder for [`ConfigStore`].
#[derive(Debug)]
pub struct ConfigStoreBuilder {
    root: PathBuf,
    seed: Mapping,
    files: Vec<PathBuf>,
    env: Option<BTreeMap<String, String>>,
}

impl ConfigStoreBuilder {
    fn new() -> Self {
        Self {
            root: PathBuf::from(constants::CONFIG_ROOT),
            seed: Mapping::new(),
            files: Vec::new(),
            env: None,
        }
    }

    /// Directory that relative file names are resolved against.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Seed a top-level property. Files loaded later may override it.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.seed.insert(key.into(), Node::from(value.into()));
        self
    }

    /// Seed a top-level property computed on every read.
    pub fn deferred<F>(mut self, key: impl Into<String>, thunk: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.seed
            .insert(key.into(), Node::Deferred(Deferred::new(thunk)));
        self
    }

    /// Seed every key of a mapping value. Non-mapping values are ignored.
    pub fn properties(mut self, value: Value) -> Self {
        if let Node::Mapping(map) = Node::from(value) {
            self.seed.extend(map);
        }
        self
    }

    /// Append one file to the load order.
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    /// Append several files to the load order.
    pub fn files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Use these variables instead of the process environment for the
    /// first interpolation pass.
    pub fn env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Load, merge and interpolate. Never fails; see [`loader`].
    pub fn load(self) -> ConfigStore {
        let env = self
            .env
            .unwrap_or_else(|| interpolate::utf8_vars(std::env::vars_os()));

        let mut store = ConfigStore {
            root: self.root,
            seed: Node::Mapping(self.seed),
            files: self.files,
            env: interpolate::env_context(&env),
            values: Node::mapping(),
        };
        store.reload();
        store
    }
}

/// Resolved, read-only configuration.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
    seed: Node,
    files: Vec<PathBuf>,
    env: Node,
    values: Node,
}

impl ConfigStore {
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::new()
    }

    /// Re-read every file and rebuild the tree from the original seed.
    pub fn reload(&mut self) {
        let documents: Vec<Node> = self
            .files
            .iter()
            .map(|file| loader::load_file(&self.root.join(file)))
            .collect();

        let mut values = self.seed.clone();
        merge::merge(&mut values, &documents);

        interpolate::expand(&mut values, &self.env);
        let snapshot = values.clone();
        interpolate::expand(&mut values, &snapshot);

        debug!(
            files = self.files.len(),
            leaves = values.leaf_count(),
            "resolved config"
        );
        self.values = values;
    }

    /// Mandatory lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming `path` when it is absent at any
    /// level or resolves to null.
    pub fn get(&self, path: &str) -> Result<Value> {
        self.get_opt(path).ok_or_else(|| {
            ConfigError::Missing {
                path: path.to_string(),
            }
            .into()
        })
    }

    /// Lookup with a default used when `path` is absent or null.
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        match self.node(path) {
            Some(node) => node.force(),
            None => default.into(),
        }
    }

    /// Optional lookup.
    pub fn get_opt(&self, path: &str) -> Option<Value> {
        self.node(path)
            .map(Node::force)
            .filter(|value| !value.is_null())
    }

    /// Mandatory typed lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if absent, `ConfigError::Type` if the
    /// value does not deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path)?;
        convert(path, value)
    }

    /// Typed lookup with a default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Type` if a value is present but does not
    /// deserialize into `T`.
    pub fn get_as_or<T: DeserializeOwned>(&self, path: &str, default: T) -> Result<T> {
        match self.get_opt(path) {
            Some(value) => convert(path, value),
            None => Ok(default),
        }
    }

    /// Mandatory scalar lookup rendered as text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if absent, `ConfigError::NotScalar`
    /// for mappings and sequences.
    pub fn get_str(&self, path: &str) -> Result<String> {
        match self.get(path)? {
            Value::String(s) => Ok(s),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(ConfigError::NotScalar {
                path: path.to_string(),
            }
            .into()),
        }
    }

    /// Whether `path` resolves to a non-null value.
    pub fn contains(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    /// The resolved tree.
    pub fn tree(&self) -> &Node {
        &self.values
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn node(&self, path: &str) -> Option<&Node> {
        match path::resolve(&self.values, path) {
            Ok(node) if !node.is_null() => Some(node),
            Ok(_) => None,
            Err(e) => {
                trace!(error = %e, "config lookup missed");
                None
            }
        }
    }
}

fn convert<T: DeserializeOwned>(path: &str, value: Value) -> Result<T> {
    serde_yaml::from_value(value).map_err(|source| {
        ConfigError::Type {
            path: path.to_string(),
            source,
        }
        .into()
    })
}
