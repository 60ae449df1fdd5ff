//! Application keys: `base64:` followed by random bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::Generator;
use crate::core::constants;

/// Generates `base64:`-prefixed keys from a cryptographically secure source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppKeyGenerator {
    length: usize,
}

impl AppKeyGenerator {
    /// `length` is the number of random bytes, not the encoded length.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate using the given random source.
    pub fn generate_with<R: RngCore + CryptoRng>(&self, rng: &mut R) -> String {
        let mut bytes = Zeroizing::new(vec![0u8; self.length]);
        rng.fill_bytes(bytes.as_mut_slice());
        format!("{}{}", constants::APP_KEY_PREFIX, STANDARD.encode(bytes.as_slice()))
    }
}

impl Default for AppKeyGenerator {
    fn default() -> Self {
        Self::new(constants::APP_KEY_LENGTH)
    }
}

impl Generator for AppKeyGenerator {
    fn generate(&self) -> String {
        self.generate_with(&mut OsRng)
    }
}
