//! Age encryption of opaque payloads.
//!
//! A vault key is a single X25519 identity. Payloads are encrypted to the
//! identity's own recipient and ASCII armored, so the identity string acts as
//! a symmetric key. The age payload is authenticated: a wrong key or a
//! modified ciphertext fails to decrypt.

use std::fmt;
use std::io::{Read, Write};

use ::age::secrecy::ExposeSecret;
use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};

/// Symmetric vault key backed by an age X25519 identity.
pub struct SecretKey {
    identity: x25519::Identity,
}

impl SecretKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            identity: x25519::Identity::generate(),
        }
    }

    /// Parse a key from its `AGE-SECRET-KEY-1...` string form.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if the string is not an age identity.
    pub fn parse(key: &str) -> Result<Self> {
        let identity = key
            .trim()
            .parse::<x25519::Identity>()
            .map_err(|e: &str| CipherError::InvalidKey(e.to_string()))?;
        Ok(Self { identity })
    }

    /// The key's string form. Handle with care.
    pub fn expose(&self) -> Zeroizing<String> {
        Zeroizing::new(self.identity.to_string().expose_secret().to_string())
    }

    /// Encrypt `plaintext` into an armored age file.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let recipient = self.identity.to_public();
        let encryptor =
            age::Encryptor::with_recipients(std::iter::once(&recipient as &dyn age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut encrypted = Vec::new();
        let mut writer = encryptor
            .wrap_output(
                age::armor::ArmoredWriter::wrap_output(
                    &mut encrypted,
                    age::armor::Format::AsciiArmor,
                )
                .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?,
            )
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        writer
            .write_all(plaintext)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        writer
            .finish()
            .and_then(|armor| armor.finish())
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        trace!(ciphertext_len = encrypted.len(), "encrypted");
        Ok(encrypted)
    }

    /// Decrypt an armored (or binary) age file.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` for malformed input, a wrong
    /// key, or an authentication failure.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        trace!(ciphertext_len = ciphertext.len(), "decrypting");

        let reader = age::armor::ArmoredReader::new(ciphertext);
        let decryptor = age::Decryptor::new(reader)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut stream = decryptor
            .decrypt(std::iter::once(&self.identity as &dyn age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut decrypted = Zeroizing::new(Vec::new());
        stream
            .read_to_end(&mut decrypted)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        trace!(plaintext_len = decrypted.len(), "decrypted");
        Ok(decrypted)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("recipient", &self.identity.to_public().to_string())
            .finish()
    }
}
