//! AWS Secrets Manager backend.
//!
//! Stores each state record as the `SecretString` of one secret.
//! Enable with `--features aws`.
//!
//! ## Usage
//!
//! Configure the backend with:
//! ```yaml
//! state:
//!   backend:
//!     kind: aws
//!     region: eu-west-1
//! ```
//!
//! Credentials come from the environment (AWS_ACCESS_KEY_ID, etc.) or the
//! default credential provider chain. The region falls back to the default
//! provider chain when not configured.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tracing::trace;

use super::SecretStore;
use crate::error::StoreError;

/// AWS Secrets Manager secret store.
#[derive(Debug, Clone)]
pub struct AwsSecretsManager {
    client: Client,
}

impl AwsSecretsManager {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS configuration chain.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManager {
    fn name(&self) -> &'static str {
        "aws-secretsmanager"
    }

    async fn get_value(&self, key: &str) -> Result<String, StoreError> {
        trace!(secret_id = key, "GetSecretValue");

        let output = self
            .client
            .get_secret_value()
            .secret_id(key)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_resource_not_found_exception() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Backend(format!("GetSecretValue failed: {}", DisplayErrorContext(&err)))
                }
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| StoreError::Backend(format!("secret '{}' has no string value", key)))
    }

    async fn put_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        trace!(secret_id = key, len = value.len(), "PutSecretValue");

        self.client
            .put_secret_value()
            .secret_id(key)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_resource_not_found_exception() {
                    StoreError::NotFound(key.to_string())
                } else {
                    StoreError::Backend(format!("PutSecretValue failed: {}", DisplayErrorContext(&err)))
                }
            })?;

        Ok(())
    }

    async fn create_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        trace!(name = key, len = value.len(), "CreateSecret");

        self.client
            .create_secret()
            .name(key)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                if err.is_resource_exists_exception() {
                    StoreError::AlreadyExists(key.to_string())
                } else {
                    StoreError::Backend(format!("CreateSecret failed: {}", DisplayErrorContext(&err)))
                }
            })?;

        Ok(())
    }
}
