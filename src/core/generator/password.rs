//! Random passwords from a fixed alphabet.

use rand::rngs::OsRng;
use rand::Rng;

use super::{CharClass, Generator};
use crate::core::constants;
use crate::error::GeneratorError;

/// Generates passwords of a fixed size.
///
/// Every character is an independent, uniform draw from the alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordGenerator {
    size: usize,
    alphabet: Vec<char>,
}

impl PasswordGenerator {
    /// Alphabet is the concatenation of `classes`; alphanumeric when empty.
    pub fn new(size: usize, classes: &[CharClass]) -> Self {
        let alphabet: String = if classes.is_empty() {
            CharClass::AlphaNumeric.chars()
        } else {
            classes.iter().map(|class| class.chars()).collect()
        };

        Self {
            size,
            alphabet: alphabet.chars().collect(),
        }
    }

    /// Use a custom alphabet.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::EmptyAlphabet` if `alphabet` is empty.
    pub fn with_alphabet(size: usize, alphabet: &str) -> Result<Self, GeneratorError> {
        if alphabet.is_empty() {
            return Err(GeneratorError::EmptyAlphabet);
        }
        Ok(Self {
            size,
            alphabet: alphabet.chars().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Generate using the given random source.
    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> String {
        (0..self.size)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self::new(constants::PASSWORD_LENGTH, &[CharClass::AlphaNumeric])
    }
}

impl Generator for PasswordGenerator {
    fn generate(&self) -> String {
        self.generate_with(&mut OsRng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_exact_length() {
        for size in [0, 1, 16, 32, 100] {
            let generator = PasswordGenerator::new(size, &[CharClass::AlphaNumeric]);
            assert_eq!(generator.generate().chars().count(), size);
        }
    }

    #[test]
    fn test_only_alphabet_characters() {
        let generator = PasswordGenerator::new(256, &[CharClass::Numeric, CharClass::Symbols]);
        let allowed = generator.alphabet().to_vec();
        let password = generator.generate();
        assert!(password.chars().all(|c| allowed.contains(&c)));
    }

    #[test]
    fn test_empty_classes_default_to_alphanumeric() {
        let generator = PasswordGenerator::new(8, &[]);
        assert_eq!(generator.alphabet().len(), 62);
    }

    #[test]
    fn test_default_is_32_alphanumeric() {
        let generator = PasswordGenerator::default();
        assert_eq!(generator.size(), 32);
        assert!(generator.generate().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_custom_alphabet() {
        let generator = PasswordGenerator::with_alphabet(10, "ab").unwrap();
        let password = generator.generate();
        assert!(password.chars().all(|c| c == 'a' || c == 'b'));
        assert!(matches!(
            PasswordGenerator::with_alphabet(10, ""),
            Err(GeneratorError::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let generator = PasswordGenerator::default();
        let a = generator.generate_with(&mut StdRng::seed_from_u64(7));
        let b = generator.generate_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_distribution_is_roughly_uniform() {
        let generator = PasswordGenerator::new(100_000, &[CharClass::Numeric]);
        let password = generator.generate_with(&mut StdRng::seed_from_u64(42));

        let mut counts: HashMap<char, usize> = HashMap::new();
        for c in password.chars() {
            *counts.entry(c).or_default() += 1;
        }

        // 10 symbols, 10_000 expected each; allow a generous band.
        assert_eq!(counts.len(), 10);
        for (c, count) in counts {
            assert!(
                (9_000..=11_000).contains(&count),
                "character {c} drawn {count} times"
            );
        }
    }
}
