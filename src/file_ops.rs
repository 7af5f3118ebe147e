//! File encryption/decryption operations
//!
//! This module connects files (or stdout) to the payload framing and codec.
//! Output files are replaced atomically and, on Unix, created with mode 0o600.

use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use crate::key_reader::KeyReader;
use crate::payload::{self, Direction, Framing};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Encrypt the text in `input_path`
///
/// The key comes from `key_reader`. The result is written to `output_path`,
/// or to stdout when no path is given.
pub fn encrypt_file(
    input_path: &Path,
    output_path: Option<&Path>,
    key_reader: &mut dyn KeyReader,
    framing: Framing,
) -> Result<()> {
    let plaintext = read_text(input_path)?;
    let key = key_reader.read_key()?;
    debug!(
        input = %input_path.display(),
        bytes = plaintext.len(),
        ?framing,
        "encrypting"
    );
    let sealed = payload::seal_text(&plaintext, &key, framing)
        .map_err(|e| e.with_context("encryption failed"))?;
    emit(output_path, &sealed)
}

/// Decrypt the envelope or JSON payload in `input_path`
///
/// The recovered plaintext is written to `output_path`, or to stdout when no
/// path is given.
pub fn decrypt_file(
    input_path: &Path,
    output_path: Option<&Path>,
    key_reader: &mut dyn KeyReader,
) -> Result<()> {
    let input = read_text(input_path)?;
    let key = key_reader.read_key()?;
    match payload::Payload::parse(&input) {
        payload::Payload::Field { name, .. } => {
            debug!(input = %input_path.display(), field = name, "decrypting payload field")
        }
        payload::Payload::Raw(_) => {
            debug!(input = %input_path.display(), "decrypting raw envelope")
        }
    }
    let plaintext =
        payload::open_text(&input, &key).map_err(|e| e.with_context("failed to decrypt"))?;
    emit(output_path, &plaintext)
}

/// Describe the contents of `input_path` without touching any key.
pub fn inspect_file(input_path: &Path, direction: Direction) -> Result<String> {
    let input = read_text(input_path)?;
    Ok(payload::describe(&input, direction))
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| read_error(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidInput,
            format!("{} is not valid UTF-8", path.display()),
            e,
        )
    })
}

fn emit(output_path: Option<&Path>, contents: &str) -> Result<()> {
    match output_path {
        Some(path) => {
            write_file_secure(path, contents.as_bytes())
                .map_err(|e| e.with_context(format!("failed to write to {}", path.display())))?;
            debug!(output = %path.display(), bytes = contents.len(), "wrote output");
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", contents)
                .and_then(|_| stdout.flush())
                .map_err(|e| {
                    AesboxError::with_kind_and_source(
                        ErrorCategory::Internal,
                        ErrorKind::Io,
                        "failed to write to stdout",
                        e,
                    )
                })
        }
    }
}

/// Atomically replace `path` with `contents` (tempfile + fsync + rename).
///
/// Either the old file or the complete new file exists afterwards, never a
/// partial one. The file ends up with mode 0o600 on Unix.
fn write_file_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    temp_file.flush().map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                AesboxError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> AesboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    AesboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::key_reader::ConstantKeyReader;
    use crate::payload::REQUEST_FIELD;
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    const KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.aesbox");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, "Hello, aesbox!").unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        encrypt_file(&plain_path, Some(&crypt_path), &mut reader, Framing::Json).unwrap();

        let framed: Value = serde_json::from_str(&fs::read_to_string(&crypt_path).unwrap()).unwrap();
        assert!(framed[REQUEST_FIELD].is_string());

        let mut reader = ConstantKeyReader::new(KEY);
        decrypt_file(&crypt_path, Some(&decrypted_path), &mut reader).unwrap();
        assert_eq!(fs::read_to_string(&decrypted_path).unwrap(), "Hello, aesbox!");
    }

    #[test]
    fn test_raw_framing() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.aesbox");

        fs::write(&plain_path, "raw please").unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        encrypt_file(&plain_path, Some(&crypt_path), &mut reader, Framing::Raw).unwrap();

        let envelope = fs::read_to_string(&crypt_path).unwrap();
        assert_eq!(codec::decrypt(&envelope, KEY).unwrap(), "raw please");
    }

    #[test]
    fn test_overwrites_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.aesbox");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, "new").unwrap();
        fs::write(&decrypted_path, "old content that is longer").unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        encrypt_file(&plain_path, Some(&crypt_path), &mut reader, Framing::Json).unwrap();
        decrypt_file(&crypt_path, Some(&decrypted_path), &mut reader).unwrap();

        assert_eq!(fs::read_to_string(&decrypted_path).unwrap(), "new");
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.aesbox");

        fs::write(&plain_path, "test").unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        encrypt_file(&plain_path, Some(&crypt_path), &mut reader, Framing::Json).unwrap();

        let metadata = fs::metadata(&crypt_path).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.aesbox");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, "secret").unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        encrypt_file(&plain_path, Some(&crypt_path), &mut reader, Framing::Json).unwrap();

        let mut reader = ConstantKeyReader::new("AAAAAAAAAAAAAAAAAAAAAA==");
        let err = decrypt_file(&crypt_path, Some(&decrypted_path), &mut reader)
            .expect_err("expected decryption failure");
        assert_eq!(err.kind, Some(ErrorKind::DecryptionFailed));
        assert!(!decrypted_path.exists());
    }

    #[test]
    fn test_empty_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("empty.txt");
        let crypt_path = temp_dir.path().join("empty.txt.aesbox");

        fs::write(&plain_path, b"").unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        let err = encrypt_file(&plain_path, Some(&crypt_path), &mut reader, Framing::Json)
            .expect_err("empty input is rejected");
        assert_eq!(err.kind, Some(ErrorKind::EmptyInput));
        assert!(!crypt_path.exists());
    }

    #[test]
    fn test_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");

        let mut reader = ConstantKeyReader::new(KEY);
        let err = decrypt_file(&missing, None, &mut reader).expect_err("missing file");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_non_utf8_input() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("binary.bin");
        fs::write(&plain_path, [0xFFu8, 0x00, 0xFE]).unwrap();

        let mut reader = ConstantKeyReader::new(KEY);
        let err = encrypt_file(&plain_path, None, &mut reader, Framing::Raw)
            .expect_err("binary input is rejected");
        assert_eq!(err.kind, Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_inspect_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("payload.json");
        fs::write(&path, r#"{"ResponseData": "abcdefgh"}"#).unwrap();

        let description = inspect_file(&path, Direction::Decrypt).unwrap();
        assert_eq!(description, "Valid JSON detected. ResponseData length: 8");
    }
}
