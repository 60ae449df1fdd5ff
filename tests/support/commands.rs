//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a bunker command isolated from the caller's environment.
    ///
    /// Returns a Command configured with:
    /// - Current directory set to the test project directory
    /// - Environment selection variables cleared
    /// - NO_COLOR set so output can be matched
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("bunker").expect("failed to find bunker binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("ENVIRONMENT");
        cmd.env_remove("ENV_CONFIG_FILE");
        cmd.env_remove("ADDITIONAL_CONFIG_FILES");
        cmd.env_remove("BUNKER_LOG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Shortcut for `bunker bootstrap`.
    pub fn bootstrap(&self) -> Output {
        self.cmd()
            .arg("bootstrap")
            .output()
            .expect("failed to run bunker bootstrap")
    }

    /// Shortcut for `bunker bootstrap --json`, parsed.
    pub fn bootstrap_json(&self) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["bootstrap", "--json"])
            .output()
            .expect("failed to run bunker bootstrap --json");
        super::assert_success(&output);
        serde_json::from_slice(&output.stdout).expect("bootstrap --json printed invalid JSON")
    }

    /// Shortcut for `bunker config [path]`.
    pub fn config(&self, path: Option<&str>) -> Output {
        let mut cmd = self.cmd();
        cmd.arg("config");
        if let Some(path) = path {
            cmd.arg(path);
        }
        cmd.output().expect("failed to run bunker config")
    }
}
