//! Wire format for encrypted data
//!
//! An envelope is the IV followed directly by the AES-CBC ciphertext,
//! encoded as standard (padded) base64:
//!
//! - iv: 16 bytes
//! - ciphertext: N bytes, N a positive multiple of 16
//!
//! There is no version marker, algorithm identifier or length prefix. The AES
//! variant is implied by the key.

use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Length of the IV in bytes (one AES block)
pub const IV_LEN: usize = 16;

/// AES block size in bytes
pub const BLOCK_LEN: usize = 16;

/// Smallest valid envelope: IV plus a single padding block
pub const MIN_ENVELOPE_LEN: usize = IV_LEN + BLOCK_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// Callers must pass block-aligned, non-empty ciphertext; outside the
    /// crate envelopes are only built through [`Envelope::from_bytes`] and
    /// [`Envelope::decode`], which check it.
    pub(crate) fn new(iv: [u8; IV_LEN], ciphertext: Vec<u8>) -> Self {
        Self { iv, ciphertext }
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Length of the binary envelope, IV included.
    pub fn byte_len(&self) -> usize {
        IV_LEN + self.ciphertext.len()
    }

    /// Split raw `iv || ciphertext` bytes, validating the layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_ENVELOPE_LEN {
            return Err(AesboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                format!(
                    "envelope is {} bytes; at least {} are required; likely truncated",
                    bytes.len(),
                    MIN_ENVELOPE_LEN
                ),
            ));
        }

        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        if ciphertext.len() % BLOCK_LEN != 0 {
            return Err(AesboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                format!(
                    "ciphertext length {} is not a multiple of the {}-byte block size",
                    ciphertext.len(),
                    BLOCK_LEN
                ),
            ));
        }

        let iv: [u8; IV_LEN] = iv.try_into().map_err(|_| {
            AesboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                "failed to read iv",
            )
        })?;

        Ok(Self {
            iv,
            ciphertext: ciphertext.to_vec(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(self.byte_len());
        output.extend_from_slice(&self.iv);
        output.extend_from_slice(&self.ciphertext);
        output
    }

    /// Base64-encode the envelope for transport.
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode a base64 envelope. Surrounding whitespace is ignored.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::MalformedEnvelope,
                format!("base64 decoding failed: {}", e),
                e,
            )
        })?;
        Self::from_bytes(&bytes)
    }
}
