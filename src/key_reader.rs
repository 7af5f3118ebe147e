//! Sources for the base64 key
//!
//! Keys are base64 text, so every reader returns a string with surrounding
//! whitespace removed (a key piped from a file usually ends in a newline).

use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Trait for reading keys from various sources
pub trait KeyReader {
    /// Read the base64-encoded key.
    ///
    /// Returns the key wrapped in `Zeroizing` so that it is wiped from memory
    /// when dropped.
    fn read_key(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed key (for testing)
pub struct ConstantKeyReader {
    key: Zeroizing<String>,
}

impl ConstantKeyReader {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Zeroizing::new(key.into()),
        }
    }
}

impl KeyReader for ConstantKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(self.key.trim().to_string()))
    }
}

/// Reads the key from any io::Read source, such as stdin
pub struct ReaderKeyReader {
    reader: Box<dyn Read>,
}

impl ReaderKeyReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl KeyReader for ReaderKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<String>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading key: {}", e),
                e,
            )
        })?;
        let text = std::str::from_utf8(&data).map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::InvalidKey,
                "key is not valid UTF-8 text",
                e,
            )
        })?;
        Ok(Zeroizing::new(text.trim().to_string()))
    }
}

/// Reads the key from an environment variable
pub struct EnvKeyReader {
    var: String,
}

impl EnvKeyReader {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl KeyReader for EnvKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<String>> {
        let value = std::env::var(&self.var).map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::KeyUnavailable,
                format!("cannot read key from environment variable {}", self.var),
                e,
            )
        })?;
        let value = Zeroizing::new(value);
        Ok(Zeroizing::new(value.trim().to_string()))
    }
}

/// Reads the key from the terminal with no echo
pub struct TerminalKeyReader;

impl TerminalKeyReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalKeyReader {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyReader for TerminalKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<String>> {
        if !io::stdin().is_terminal() {
            return Err(AesboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::KeyUnavailable,
                "cannot read key from terminal - stdin is not a terminal; \
                 use --key-stdin or --key-env",
            ));
        }

        io::stderr()
            .write_all(b"AES key (base64): ")
            .map_err(|e| {
                AesboxError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    format!("failed to write prompt: {}", e),
                    e,
                )
            })?;
        io::stderr().flush().map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to flush prompt: {}", e),
                e,
            )
        })?;

        // Read *without echo*
        let key = Zeroizing::new(rpassword::read_password().map_err(|e| {
            AesboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::KeyUnavailable,
                format!("failure reading key: {}", e),
                e,
            )
        })?);

        Ok(Zeroizing::new(key.trim().to_string()))
    }
}
