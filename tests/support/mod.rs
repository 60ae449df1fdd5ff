//! Test support utilities for bunker integration tests.
//!
//! Provides isolated config directories and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Test project with its own config root and state directory.
///
/// No process-global state is mutated: child processes use `.current_dir()`
/// and explicit env vars so tests can safely run in parallel.
pub struct Test {
    /// Temporary project directory
    pub dir: TempDir,
}

impl Test {
    /// Create a project with an empty `config/` directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::create_dir_all(dir.path().join("config/env")).expect("failed to create config dir");
        Self { dir }
    }

    /// Create a project with `base` as its `config.yaml`.
    pub fn with_config(base: &str) -> Self {
        let t = Self::new();
        t.write_config("config.yaml", base);
        t
    }

    /// Write a file relative to `config/`.
    pub fn write_config(&self, name: &str, contents: &str) {
        let path = self.config_root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create config subdir");
        }
        fs::write(path, contents).expect("failed to write config file");
    }

    pub fn config_root(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    /// Directory the file backend persists records in.
    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join(".bunker/state")
    }

    /// Raw persisted record for `key`, if any.
    pub fn persisted(&self, key: &str) -> Option<String> {
        fs::read_to_string(state_file(&self.state_dir(), key)).ok()
    }
}

/// Path the file backend uses for `key`.
pub fn state_file(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key.replace('/', "__")))
}
