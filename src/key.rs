//! AES key material
//!
//! Keys travel as standard Base64 strings and must decode to 16, 24 or 32
//! bytes, which selects AES-128, AES-192 or AES-256 respectively.

use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::fmt;
use zeroize::Zeroizing;

/// AES variant implied by the decoded key length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Maps a raw key length in bytes to the matching AES variant.
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(Self::Aes128),
            24 => Some(Self::Aes192),
            32 => Some(Self::Aes256),
            _ => None,
        }
    }

    pub fn bits(self) -> usize {
        self.bytes() * 8
    }

    pub fn bytes(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}

/// A validated AES key. The bytes are wiped on drop.
#[derive(Clone)]
pub struct Key {
    bytes: Zeroizing<Vec<u8>>,
    size: KeySize,
}

impl Key {
    /// Decode a Base64 key. Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = Zeroizing::new(STANDARD.decode(encoded.trim()).map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidKey,
                format!("key is not valid base64: {}", e),
                e,
            )
        })?);
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let size = KeySize::from_len(bytes.len()).ok_or_else(|| {
            AesboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidKey,
                format!(
                    "key decodes to {} bytes; AES requires 16, 24 or 32",
                    bytes.len()
                ),
            )
        })?;
        Ok(Self {
            bytes: Zeroizing::new(bytes.to_vec()),
            size,
        })
    }

    pub fn size(&self) -> KeySize {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("size", &self.size)
            .field("bytes", &"<redacted>")
            .finish()
    }
}
