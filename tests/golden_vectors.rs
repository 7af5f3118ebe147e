//! Golden test vector validation
//!
//! Each vector pins the exact envelope produced for a key, IV and plaintext,
//! so changes to padding, IV placement or base64 flavour are caught.

use anyhow::{Result, ensure};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GoldenVector {
    plaintext: String,
    key: String,
    iv: String,
    envelope: String,
    comment: String,
}

fn load_golden_vectors() -> Result<Vec<GoldenVector>> {
    let json_data = include_str!("../testdata/golden-vectors.json");
    let vectors: Vec<GoldenVector> = serde_json::from_str(json_data)?;
    Ok(vectors)
}

fn check_vector(vector: &GoldenVector) -> Result<()> {
    let iv: [u8; aesbox::envelope::IV_LEN] = BASE64_STANDARD
        .decode(&vector.iv)?
        .try_into()
        .map_err(|iv: Vec<u8>| anyhow::anyhow!("iv must be 16 bytes, got {}", iv.len()))?;

    let encrypted = aesbox::codec::encrypt_with_iv(&vector.plaintext, &vector.key, &iv)?;
    ensure!(
        encrypted == vector.envelope,
        "envelope mismatch\n  expected: {}\n  actual:   {}",
        vector.envelope,
        encrypted
    );

    let decrypted = aesbox::codec::decrypt(&vector.envelope, &vector.key)?;
    ensure!(
        decrypted == vector.plaintext,
        "plaintext mismatch (expected {} bytes, got {})",
        vector.plaintext.len(),
        decrypted.len()
    );

    Ok(())
}

#[test]
fn test_golden_vectors() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    println!("Testing {} golden vectors", vectors.len());

    let mut failed = 0;
    for (i, vector) in vectors.iter().enumerate() {
        if let Err(e) = check_vector(vector) {
            eprintln!("Vector {}: FAILED - {}", i, e);
            eprintln!("  Comment: {}", vector.comment);
            failed += 1;
        }
    }

    assert_eq!(failed, 0, "Some golden vectors failed validation");
    assert!(!vectors.is_empty(), "No golden vectors were tested");
}

#[test]
fn test_golden_vectors_cover_all_key_sizes() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let mut sizes: Vec<usize> = vectors
        .iter()
        .map(|v| BASE64_STANDARD.decode(&v.key).unwrap().len())
        .collect();
    sizes.sort_unstable();
    sizes.dedup();
    assert_eq!(sizes, vec![16, 24, 32]);
}

#[test]
fn test_golden_vectors_wrong_key_fails() {
    let vectors = load_golden_vectors().expect("failed to load golden vectors");
    let wrong_key = BASE64_STANDARD.encode([0xEEu8; 32]);

    for vector in &vectors {
        let err = aesbox::codec::decrypt(&vector.envelope, &wrong_key)
            .expect_err("decrypting under an unrelated key must fail");
        assert_eq!(
            err.kind,
            Some(aesbox::error::ErrorKind::DecryptionFailed),
            "{}",
            vector.comment
        );
    }
}
