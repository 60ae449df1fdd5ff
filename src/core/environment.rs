//! Deployment environment selection.
//!
//! Decides which environment is being deployed and which config files
//! describe it:
//!
//! 1. `config.yaml`
//! 2. `$ENV_CONFIG_FILE`, or `env/<general environment>.yaml`
//! 3. each entry of `$ADDITIONAL_CONFIG_FILES` (comma-separated)

use std::path::PathBuf;

use crate::core::constants;

/// The environment being deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    env_config_file: Option<String>,
    additional_files: Vec<String>,
}

impl Environment {
    /// Resolve from the process environment.
    ///
    /// `explicit` (usually a CLI flag) takes precedence over `ENVIRONMENT`.
    pub fn from_process(explicit: Option<&str>) -> Self {
        Self::resolve(explicit, |var| std::env::var(var).ok())
    }

    /// Resolve using `lookup` in place of the process environment.
    pub fn resolve<F>(explicit: Option<&str>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: String| (!value.trim().is_empty()).then_some(value);

        let name = explicit
            .map(str::to_string)
            .and_then(non_empty)
            .or_else(|| lookup(constants::ENVIRONMENT_VAR).and_then(non_empty))
            .unwrap_or_else(|| constants::DEFAULT_ENVIRONMENT.to_string());

        let env_config_file = lookup(constants::ENV_CONFIG_FILE_VAR).and_then(non_empty);

        let additional_files = lookup(constants::ADDITIONAL_CONFIG_FILES_VAR)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|file| !file.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name,
            env_config_file,
            additional_files,
        }
    }

    /// The environment name, e.g. `staging` or `pr-142`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The environment family: `pr-*` collapses to `pr`.
    pub fn general(&self) -> &str {
        if self.is_preview() {
            "pr"
        } else {
            &self.name
        }
    }

    /// Whether this is an ephemeral pull-request environment.
    pub fn is_preview(&self) -> bool {
        self.name.starts_with(constants::PR_ENVIRONMENT_PREFIX)
    }

    /// Config files to load, relative to the config root, in merge order.
    pub fn config_files(&self) -> Vec<PathBuf> {
        let mut files = vec![PathBuf::from(constants::BASE_CONFIG_FILE)];

        files.push(match &self.env_config_file {
            Some(file) => PathBuf::from(file),
            None => PathBuf::from(constants::ENV_CONFIG_DIR).join(format!("{}.yaml", self.general())),
        });

        files.extend(self.additional_files.iter().map(PathBuf::from));
        files
    }
}
