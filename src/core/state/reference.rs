//! Indirect references to persisted secret fields.

use std::fmt;

use serde::Serialize;

/// Points at one field of a persisted state record.
///
/// Carries no secret material. Its `Display` form is a CloudFormation
/// dynamic reference, resolved by the deployment service at deploy time:
///
/// ```text
/// {{resolve:secretsmanager:app/secret:SecretString:DB_PASSWORD}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SecretRef {
    store_key: String,
    field: String,
}

impl SecretRef {
    pub fn new(store_key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            store_key: store_key.into(),
            field: field.into(),
        }
    }

    /// The secret holding the record.
    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    /// The JSON field within the record.
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{{resolve:secretsmanager:{}:SecretString:{}}}}}",
            self.store_key, self.field
        )
    }
}
