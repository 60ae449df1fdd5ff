//! State value definitions.
//!
//! A definition says how to obtain the *default* value of a state field:
//! either a literal, or a generator evaluated once at construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::core::constants;
use crate::core::generator::{AppKeyGenerator, CharClass, Generator, GeneratorSpec, PasswordGenerator};
use crate::core::types::StateKey;
use crate::error::{Result, StateError};

/// How to produce the default value of a state field.
pub enum StateValue {
    Literal(String),
    Generated(Box<dyn Generator>),
}

impl StateValue {
    pub fn generated(generator: impl Generator + 'static) -> Self {
        Self::Generated(Box::new(generator))
    }

    /// Produce the value. Generators draw fresh randomness on every call.
    pub fn evaluate(&self) -> String {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Generated(generator) => generator.generate(),
        }
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => f.write_str("Literal(..)"),
            Self::Generated(generator) => f.debug_tuple("Generated").field(generator).finish(),
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<PasswordGenerator> for StateValue {
    fn from(generator: PasswordGenerator) -> Self {
        Self::generated(generator)
    }
}

impl From<AppKeyGenerator> for StateValue {
    fn from(generator: AppKeyGenerator) -> Self {
        Self::generated(generator)
    }
}

/// One entry of the `state.secrets` config section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Definition {
    Literal(String),
    Generator(GeneratorSpec),
}

impl From<Definition> for StateValue {
    fn from(definition: Definition) -> Self {
        match definition {
            Definition::Literal(value) => Self::Literal(value),
            Definition::Generator(spec) => Self::Generated(spec.build()),
        }
    }
}

/// Parse the `state.secrets` config section.
///
/// # Errors
///
/// Returns `StateError::InvalidDefinition` naming the first entry that is
/// neither a string nor a generator definition, or whose key is invalid.
pub fn parse_definitions(value: serde_yaml::Value) -> Result<BTreeMap<StateKey, StateValue>> {
    let serde_yaml::Value::Mapping(entries) = value else {
        return Err(StateError::InvalidDefinition {
            key: "state.secrets".to_string(),
            reason: "expected a mapping of names to definitions".to_string(),
        }
        .into());
    };

    let mut definitions = BTreeMap::new();
    for (key, entry) in entries {
        let key = match key {
            serde_yaml::Value::String(key) => key,
            other => {
                return Err(StateError::InvalidDefinition {
                    key: format!("{:?}", other),
                    reason: "state keys must be strings".to_string(),
                }
                .into())
            }
        };
        validate_key(&key)?;

        let definition: Definition =
            serde_yaml::from_value(entry).map_err(|e| StateError::InvalidDefinition {
                key: key.clone(),
                reason: e.to_string(),
            })?;
        definitions.insert(key, StateValue::from(definition));
    }

    Ok(definitions)
}

/// Definitions used when the config has no `state.secrets` section.
pub fn default_definitions() -> BTreeMap<StateKey, StateValue> {
    let mut definitions = BTreeMap::new();
    definitions.insert("APP_KEY".to_string(), AppKeyGenerator::default().into());
    definitions.insert(
        "DB_PASSWORD".to_string(),
        PasswordGenerator::new(constants::PASSWORD_LENGTH, &[CharClass::AlphaNumeric]).into(),
    );
    definitions.insert(
        "DB_ROOT_PASSWORD".to_string(),
        PasswordGenerator::new(constants::PASSWORD_LENGTH, &[CharClass::AlphaNumeric]).into(),
    );
    definitions
}

/// Validate a state key.
///
/// State keys end up as environment variable names:
/// - Only A-Z, a-z, 0-9, and underscore
/// - Cannot start with a digit
/// - Cannot be empty
///
/// # Errors
///
/// Returns `StateError::InvalidDefinition` if the key is invalid.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason: String| StateError::InvalidDefinition {
        key: key.to_string(),
        reason,
    };

    let Some(first) = key.chars().next() else {
        return Err(invalid("key cannot be empty".to_string()).into());
    };
    if first.is_ascii_digit() {
        return Err(invalid("cannot start with a digit".to_string()).into());
    }

    if let Some((i, ch)) = key
        .chars()
        .enumerate()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric() && *ch != '_')
    {
        return Err(invalid(format!(
            "invalid character '{}' at position {}. Only A-Z, 0-9, and underscore are allowed",
            ch,
            i + 1
        ))
        .into());
    }

    Ok(())
}
