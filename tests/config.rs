//! Layered config loading tests.

use std::fs;

use bunker::error::{ConfigError, Error};
use bunker::{ConfigStore, Environment};
use serde::Deserialize;
use serde_yaml::Value;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn no_env() -> [(&'static str, &'static str); 0] {
    []
}

#[test]
fn test_files_merge_in_order_over_seed() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "config.yaml",
        "app:\n  name: shop\n  replicas: 1\n  zones: [a, b, c]\nenv: from-file\n",
    );
    write(&dir, "env/prod.yaml", "app:\n  replicas: 4\n  zones: [z]\n");

    let config = ConfigStore::builder()
        .root(dir.path())
        .property("env", "prod")
        .property("owner", "platform")
        .files(["config.yaml", "env/prod.yaml"])
        .env(no_env())
        .load();

    assert_eq!(config.get_str("app.name").unwrap(), "shop");
    assert_eq!(config.get_as::<u32>("app.replicas").unwrap(), 4);
    assert_eq!(config.get_as::<Vec<String>>("app.zones").unwrap(), ["z"]);
    // Files override seeded properties; untouched seed keys survive.
    assert_eq!(config.get_str("env").unwrap(), "from-file");
    assert_eq!(config.get_str("owner").unwrap(), "platform");
}

#[test]
fn test_env_then_self_interpolation() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "config.yaml",
        r#"
app:
  name: shop
  region: ${AWS_REGION}
  bucket: ${app.name}-${env}-assets
  url: https://${app.host}/
  host: ${app.name}.example.com
  optional: ${UNSET_VARIABLE}
"#,
    );

    let config = ConfigStore::builder()
        .root(dir.path())
        .property("env", "staging")
        .file("config.yaml")
        .env([("AWS_REGION", "eu-west-1")])
        .load();

    assert_eq!(config.get_str("app.region").unwrap(), "eu-west-1");
    assert_eq!(config.get_str("app.bucket").unwrap(), "shop-staging-assets");
    assert_eq!(config.get_str("app.host").unwrap(), "shop.example.com");
    // Second-order reference: `app.host` was itself unexpanded in the
    // snapshot the self pass resolved against.
    assert_eq!(config.get_str("app.url").unwrap(), "https://${app.name}.example.com/");
    assert_eq!(config.get_str("app.optional").unwrap(), "${UNSET_VARIABLE}");
}

#[test]
fn test_dotted_references_resolve_against_config() {
    let dir = TempDir::new().unwrap();
    write(&dir, "config.yaml", "app:\n  name: shop\n  label: ${app.name}\n");

    // The environment is a flat namespace, so a dotted reference can only
    // ever resolve in the self pass.
    let config = ConfigStore::builder()
        .root(dir.path())
        .file("config.yaml")
        .env([("app.name", "from-env")])
        .load();

    assert_eq!(config.get_str("app.label").unwrap(), "shop");
}

#[test]
fn test_missing_and_malformed_files_are_empty() {
    let dir = TempDir::new().unwrap();
    write(&dir, "config.yaml", "app:\n  name: shop\n");
    write(&dir, "broken.yaml", "app: [unclosed\n");

    let config = ConfigStore::builder()
        .root(dir.path())
        .files(["config.yaml", "env/missing.yaml", "broken.yaml"])
        .env(no_env())
        .load();

    assert_eq!(config.get_str("app.name").unwrap(), "shop");
}

#[test]
fn test_mixed_formats() {
    let dir = TempDir::new().unwrap();
    write(&dir, "config.yaml", "db:\n  port: 5432\n  host: localhost\n");
    write(&dir, "override.toml", "[db]\nhost = \"db.internal\"\n");
    write(&dir, "override.json", r#"{"db": {"pool": 10}}"#);

    let config = ConfigStore::builder()
        .root(dir.path())
        .files(["config.yaml", "override.toml", "override.json"])
        .env(no_env())
        .load();

    assert_eq!(config.get_str("db.host").unwrap(), "db.internal");
    assert_eq!(config.get_as::<u16>("db.port").unwrap(), 5432);
    assert_eq!(config.get_as::<u32>("db.pool").unwrap(), 10);
}

#[test]
fn test_defaults_and_mandatory_lookups() {
    let dir = TempDir::new().unwrap();
    write(&dir, "config.yaml", "app:\n  name: shop\n  owner: ~\n");

    let config = ConfigStore::builder()
        .root(dir.path())
        .file("config.yaml")
        .env(no_env())
        .load();

    assert_eq!(config.get_or("app.replicas", 2), Value::from(2));
    assert_eq!(config.get_or("nothing.here.at.all", "x"), Value::from("x"));
    assert_eq!(config.get_or("app.name", "x"), Value::from("shop"));
    assert_eq!(config.get_or("app.owner", "nobody"), Value::from("nobody"));

    let err = config.get("app.replicas").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Missing { ref path }) if path == "app.replicas"));
    assert!(err.to_string().contains("app.replicas"));

    assert!(config.get("app.owner").is_err());
    assert!(config.get_opt("app.owner").is_none());
    assert!(config.contains("app.name"));
    assert!(!config.contains("app.replicas"));
}

#[test]
fn test_typed_lookup() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Database {
        host: String,
        port: u16,
    }

    let dir = TempDir::new().unwrap();
    write(&dir, "config.yaml", "db:\n  host: localhost\n  port: 5432\nname: shop\n");

    let config = ConfigStore::builder()
        .root(dir.path())
        .file("config.yaml")
        .env(no_env())
        .load();

    assert_eq!(
        config.get_as::<Database>("db").unwrap(),
        Database {
            host: "localhost".into(),
            port: 5432
        }
    );

    let err = config.get_as::<u16>("name").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Type { .. })));
    assert!(matches!(
        config.get_str("db"),
        Err(Error::Config(ConfigError::NotScalar { .. }))
    ));
    assert_eq!(config.get_as_or("missing", 7u8).unwrap(), 7);
}

#[test]
fn test_environment_file_list_drives_store() {
    let dir = TempDir::new().unwrap();
    write(&dir, "config.yaml", "app:\n  tier: base\n  name: shop\n");
    write(&dir, "env/pr.yaml", "app:\n  tier: preview\n");
    write(&dir, "extra.yaml", "app:\n  name: shop-${env}\n");

    let vars = [("ADDITIONAL_CONFIG_FILES", "extra.yaml")];
    let environment = Environment::resolve(Some("pr-7"), |name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    });

    let config = ConfigStore::builder()
        .root(dir.path())
        .property("env", environment.name())
        .files(environment.config_files())
        .env(no_env())
        .load();

    assert_eq!(config.get_str("app.tier").unwrap(), "preview");
    assert_eq!(config.get_str("app.name").unwrap(), "shop-pr-7");
}

#[cfg(unix)]
const CHILD_MARKER: &str = "BUNKER_CONFIG_TEST_CHILD";

// Loading against the real process environment; re-runs itself in a child
// process so the non-UTF-8 variable never touches this test binary.
#[cfg(unix)]
#[test]
fn test_non_utf8_process_env_is_skipped() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use std::process::Command;

    if std::env::var_os(CHILD_MARKER).is_some() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.yaml", "app:\n  region: ${BUNKER_TEST_REGION}\n");

        let config = ConfigStore::builder()
            .root(dir.path())
            .property("a", "x")
            .file("config.yaml")
            .load();

        assert_eq!(config.get_str("a").unwrap(), "x");
        assert_eq!(config.get_str("app.region").unwrap(), "eu-west-1");
        return;
    }

    let output = Command::new(std::env::current_exe().unwrap())
        .args([
            "test_non_utf8_process_env_is_skipped",
            "--exact",
            "--test-threads=1",
        ])
        .env(CHILD_MARKER, "1")
        .env("BUNKER_TEST_REGION", "eu-west-1")
        .env("BUNKER_BAD_VAR", OsStr::from_bytes(b"\xff\xfe"))
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "child failed:\n{}\n{}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("1 passed"), "{}", stdout);
}
