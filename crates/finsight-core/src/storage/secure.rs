//! Value obfuscation for the "secure" storage helpers
//!
//! This is a repeating-key XOR followed by base64. It hides values from a
//! casual glance at the store and nothing more: anyone with the key (or a
//! few known plaintexts) can recover the data. It is NOT encryption.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Key used when none is configured
pub const DEFAULT_OBFUSCATION_KEY: &str = "SECURE_KEY_12345";

#[derive(Debug, Clone)]
pub struct Obfuscator {
    key: Vec<u8>,
}

impl Obfuscator {
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::Config("obfuscation key must not be empty".into()));
        }
        Ok(Self {
            key: key.as_bytes().to_vec(),
        })
    }

    fn xor(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }

    pub fn obfuscate(&self, plaintext: &str) -> String {
        STANDARD.encode(self.xor(plaintext.as_bytes()))
    }

    pub fn reveal(&self, encoded: &str) -> Result<String> {
        let bytes = self.xor(&STANDARD.decode(encoded.trim())?);
        String::from_utf8(bytes)
            .map_err(|e| Error::InvalidData(format!("obfuscated value is not UTF-8: {}", e)))
    }
}

impl Default for Obfuscator {
    fn default() -> Self {
        Self {
            key: DEFAULT_OBFUSCATION_KEY.as_bytes().to_vec(),
        }
    }
}
