use std::error::Error as StdError;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// Any failure that cannot be confidently attributed to any other error
    /// category in this enum.
    ///
    /// Use of Internal is never a guarantee that the error was not caused by
    /// the user - merely that the code cannot tell.
    Internal,

    /// The user provided invalid input (a bad key, a damaged envelope, an
    /// empty file) or asked for something impossible.
    User,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The key is not valid Base64 or does not decode to 16, 24 or 32 bytes.
    InvalidKey,
    /// The envelope is not valid Base64, is too short, or its ciphertext is
    /// not block aligned.
    MalformedEnvelope,
    /// Padding removal failed or the plaintext is not UTF-8. Covers a wrong
    /// key and corrupted ciphertext alike; the two cannot be told apart.
    DecryptionFailed,
    /// Input text or key was empty. Decrypt input that is only whitespace
    /// counts as empty.
    EmptyInput,
    /// The key could not be obtained from the configured reader.
    KeyUnavailable,
    /// Input could not be interpreted (for example, a file that is not UTF-8).
    InvalidInput,
    /// Unexpected state reached within aesbox logic.
    InternalInvariant,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct AesboxError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl AesboxError {
    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AesboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_kind_and_category() {
        let err = AesboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::MalformedEnvelope,
            "envelope too short",
        )
        .with_context("failed to decrypt");

        assert_eq!(err.to_string(), "failed to decrypt");
        assert_eq!(err.category, ErrorCategory::User);
        assert_eq!(err.kind, Some(ErrorKind::MalformedEnvelope));
        let inner = err.source_error().expect("context keeps the original error");
        assert_eq!(inner.to_string(), "envelope too short");
    }
}
