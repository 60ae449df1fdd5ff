//! Secret value generators.
//!
//! A [`Generator`] produces a fresh string on every call. Generators are
//! evaluated once when secret state is constructed; only their output is
//! ever persisted.
//!
//! ## Adding a New Generator
//!
//! 1. Implement the `Generator` trait
//! 2. Add a variant to `GeneratorSpec` so it can be configured
//! 3. Re-export from this module

mod app_key;
mod password;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::core::constants;
use crate::error::GeneratorError;

pub use app_key::AppKeyGenerator;
pub use password::PasswordGenerator;

/// Produces a string value on demand.
pub trait Generator: Send + Sync + fmt::Debug {
    fn generate(&self) -> String;
}

const ALPHA: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMERIC: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};:,./<>?";

/// Named character classes for passwords.
///
/// Names are matched ignoring case, `-` and `_`, so `alpha_numeric`,
/// `alpha-numeric` and `AlphaNumeric` are the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum CharClass {
    Alpha,
    Numeric,
    AlphaNumeric,
    Symbols,
    AlphaNumericSymbols,
}

impl CharClass {
    /// Characters in this class.
    pub fn chars(self) -> String {
        match self {
            Self::Alpha => ALPHA.to_string(),
            Self::Numeric => NUMERIC.to_string(),
            Self::AlphaNumeric => [ALPHA, NUMERIC].concat(),
            Self::Symbols => SYMBOLS.to_string(),
            Self::AlphaNumericSymbols => [ALPHA, NUMERIC, SYMBOLS].concat(),
        }
    }
}

impl FromStr for CharClass {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "alpha" => Ok(Self::Alpha),
            "numeric" => Ok(Self::Numeric),
            "alphanumeric" => Ok(Self::AlphaNumeric),
            "symbols" => Ok(Self::Symbols),
            "alphanumericsymbols" => Ok(Self::AlphaNumericSymbols),
            _ => Err(GeneratorError::UnknownClass(s.to_string())),
        }
    }
}

impl TryFrom<String> for CharClass {
    type Error = GeneratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Configured generator, as written in `state.secrets`:
///
/// ```yaml
/// APP_KEY: { generator: app_key, length: 32 }
/// DB_PASSWORD: { generator: password, size: 32, classes: [alpha_numeric] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "generator", rename_all = "snake_case", deny_unknown_fields)]
pub enum GeneratorSpec {
    Password {
        #[serde(default = "default_password_size")]
        size: usize,
        #[serde(default)]
        classes: Vec<CharClass>,
    },
    AppKey {
        #[serde(default = "default_app_key_length")]
        length: usize,
    },
}

fn default_password_size() -> usize {
    constants::PASSWORD_LENGTH
}

fn default_app_key_length() -> usize {
    constants::APP_KEY_LENGTH
}

impl GeneratorSpec {
    pub fn build(&self) -> Box<dyn Generator> {
        match self {
            Self::Password { size, classes } => Box::new(PasswordGenerator::new(*size, classes)),
            Self::AppKey { length } => Box::new(AppKeyGenerator::new(*length)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_class_from_str() {
        assert_eq!("alpha".parse::<CharClass>().unwrap(), CharClass::Alpha);
        assert_eq!("AlphaNumeric".parse::<CharClass>().unwrap(), CharClass::AlphaNumeric);
        assert_eq!("alpha-numeric".parse::<CharClass>().unwrap(), CharClass::AlphaNumeric);
        assert_eq!(
            "alphanumericsymbols".parse::<CharClass>().unwrap(),
            CharClass::AlphaNumericSymbols
        );
        assert!(matches!(
            "emoji".parse::<CharClass>(),
            Err(GeneratorError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_config_classes_use_the_same_names() {
        let spec: GeneratorSpec = serde_yaml::from_str(
            "generator: password\nclasses: [alpha_numeric, alpha-numeric, AlphaNumericSymbols, symbols]",
        )
        .unwrap();
        assert_eq!(
            spec,
            GeneratorSpec::Password {
                size: 32,
                classes: vec![
                    CharClass::AlphaNumeric,
                    CharClass::AlphaNumeric,
                    CharClass::AlphaNumericSymbols,
                    CharClass::Symbols,
                ]
            }
        );

        let err = serde_yaml::from_str::<GeneratorSpec>("generator: password\nclasses: [emoji]")
            .unwrap_err();
        assert!(err.to_string().contains("unknown character class: emoji"));
    }

    #[test]
    fn test_alpha_numeric_symbols_is_union() {
        let all = CharClass::AlphaNumericSymbols.chars();
        assert_eq!(all.len(), ALPHA.len() + NUMERIC.len() + SYMBOLS.len());
    }

    #[test]
    fn test_generator_config_defaults() {
        let spec: GeneratorSpec = serde_yaml::from_str("generator: password").unwrap();
        assert_eq!(
            spec,
            GeneratorSpec::Password {
                size: 32,
                classes: vec![]
            }
        );

        let spec: GeneratorSpec =
            serde_yaml::from_str("generator: app_key\nlength: 16").unwrap();
        assert_eq!(spec, GeneratorSpec::AppKey { length: 16 });
    }

    #[test]
    fn test_generator_config_rejects_unknown_fields() {
        assert!(serde_yaml::from_str::<GeneratorSpec>("generator: password\nlen: 3").is_err());
        assert!(serde_yaml::from_str::<GeneratorSpec>("generator: uuid").is_err());
    }

    #[test]
    fn test_generator_config_build() {
        let spec = GeneratorSpec::Password {
            size: 12,
            classes: vec![CharClass::Numeric],
        };
        let value = spec.build().generate();
        assert_eq!(value.len(), 12);
        assert!(value.chars().all(|c| c.is_ascii_digit()));

        let key = GeneratorSpec::AppKey { length: 16 }.build().generate();
        assert!(key.starts_with("base64:"));
    }
}
