//! Test fixtures and constants.

/// Store key used by the fixture configs.
pub const STORE_KEY: &str = "app/secret";

/// Base config using the file backend and explicit definitions.
pub const BASE_CONFIG: &str = r#"
app:
  name: shop
  context:
    key: app/secret
state:
  backend:
    kind: file
  secrets:
    APP_KEY: { generator: app_key, length: 16 }
    DB_PASSWORD: { generator: password, size: 24 }
    ENVIRONMENT: ${env}
"#;

/// Base config relying on the default secret definitions.
pub const DEFAULT_SECRETS_CONFIG: &str = r#"
app:
  context:
    key: app/secret
state:
  backend:
    kind: file
"#;

/// Staging overrides.
pub const STAGING_CONFIG: &str = r#"
app:
  replicas: 3
  domain: ${app.name}.staging.example.com
"#;
