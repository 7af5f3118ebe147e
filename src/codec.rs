//! Encryption/decryption using AES-CBC with a random IV
//!
//! This module implements the text codec:
//! - the key is a base64 string decoding to 16, 24 or 32 bytes (AES-128/192/256)
//! - every encryption draws a fresh 16-byte IV from the OS random source
//! - plaintext is PKCS#7 padded and encrypted in CBC mode
//! - the result is `base64(iv || ciphertext)`, see [`crate::envelope`]
//!
//! CBC without a MAC cannot tell a wrong key from corrupted data. Both show up
//! as [`ErrorKind::DecryptionFailed`].

use crate::envelope::{BLOCK_LEN, Envelope, IV_LEN};
use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use crate::key::{Key, KeySize};
use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use rand::rngs::OsRng;

/// Encrypt UTF-8 text under a base64 key, returning a base64 envelope.
///
/// Output differs on every call for the same inputs because the IV is random.
pub fn encrypt(plaintext: &str, key_base64: &str) -> Result<String> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    encrypt_with_iv(plaintext, key_base64, &iv)
}

/// Encrypt with a caller-provided IV.
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates a random IV.
pub fn encrypt_with_iv(plaintext: &str, key_base64: &str, iv: &[u8; IV_LEN]) -> Result<String> {
    let key = Key::from_base64(key_base64)?;
    let envelope = seal(&key, iv, plaintext.as_bytes())?;
    Ok(envelope.encode())
}

/// Decrypt a base64 envelope under a base64 key, returning the original text.
pub fn decrypt(envelope_base64: &str, key_base64: &str) -> Result<String> {
    let envelope = Envelope::decode(envelope_base64)?;
    let key = Key::from_base64(key_base64)?;
    let plaintext = open(&key, &envelope)?;

    String::from_utf8(plaintext).map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "decrypted data is not valid UTF-8; wrong key or corrupt input",
            e,
        )
    })
}

/// AES-CBC-PKCS#7 encrypt raw bytes into an envelope.
pub fn seal(key: &Key, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Result<Envelope> {
    let bytes = key.as_bytes();
    let ciphertext = match key.size() {
        KeySize::Aes128 => cbc::Encryptor::<Aes128>::new_from_slices(bytes, iv)
            .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        KeySize::Aes192 => cbc::Encryptor::<Aes192>::new_from_slices(bytes, iv)
            .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
        KeySize::Aes256 => cbc::Encryptor::<Aes256>::new_from_slices(bytes, iv)
            .map(|c| c.encrypt_padded_vec_mut::<Pkcs7>(plaintext)),
    }
    .map_err(|_| cipher_init_error(key))?;

    Ok(Envelope::new(*iv, ciphertext))
}

/// Decrypt an envelope and strip PKCS#7 padding, returning raw bytes.
pub fn open(key: &Key, envelope: &Envelope) -> Result<Vec<u8>> {
    let ciphertext = envelope.ciphertext();
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(AesboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            "ciphertext is empty or not block aligned",
        ));
    }

    let bytes = key.as_bytes();
    let iv = envelope.iv();
    let unpadded = match key.size() {
        KeySize::Aes128 => cbc::Decryptor::<Aes128>::new_from_slices(bytes, iv)
            .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        KeySize::Aes192 => cbc::Decryptor::<Aes192>::new_from_slices(bytes, iv)
            .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
        KeySize::Aes256 => cbc::Decryptor::<Aes256>::new_from_slices(bytes, iv)
            .map(|c| c.decrypt_padded_vec_mut::<Pkcs7>(ciphertext)),
    }
    .map_err(|_| cipher_init_error(key))?;

    unpadded.map_err(|_| {
        AesboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::DecryptionFailed,
            "invalid padding; wrong key or corrupt input",
        )
    })
}

// Key lengths are validated when the Key is built, so this only fires if
// that validation and the cipher disagree.
fn cipher_init_error(key: &Key) -> AesboxError {
    AesboxError::with_kind(
        ErrorCategory::Internal,
        ErrorKind::InvalidKey,
        format!(
            "cipher rejected a {}-byte key for AES-{}",
            key.as_bytes().len(),
            key.size().bits()
        ),
    )
}
