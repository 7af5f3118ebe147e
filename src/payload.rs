//! JSON payload framing around the codec
//!
//! Services exchanging envelopes wrap them in a small JSON object, using
//! either `RequestData` or `ResponseData` as the field name:
//!
//! ```json
//! {
//!   "RequestData": "<base64 envelope>"
//! }
//! ```
//!
//! The codec itself knows nothing about this. This module extracts the
//! envelope from such an object (or takes the whole input as the envelope),
//! frames freshly encrypted output, and pretty-prints decrypted JSON.

use crate::codec;
use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use serde::Serialize;
use serde_json::Value;

pub const RESPONSE_FIELD: &str = "ResponseData";
pub const REQUEST_FIELD: &str = "RequestData";

/// How encrypted output is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// `{"RequestData": "<envelope>"}`, pretty-printed
    #[default]
    Json,
    /// The bare base64 envelope
    Raw,
}

/// Which way the input is headed; only affects [`describe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Where the envelope was found in a decrypt input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Found as a non-blank string under one of the payload fields.
    Field {
        name: &'static str,
        envelope: String,
    },
    /// The whole input is taken as the envelope.
    Raw(String),
}

impl Payload {
    /// Locate the envelope in user input.
    ///
    /// The field is `ResponseData` when that holds any truthy JSON value,
    /// otherwise `RequestData`. If the chosen field is not a non-blank
    /// string, or the input is not a JSON object at all, the raw input is
    /// the envelope.
    pub fn parse(input: &str) -> Self {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(input) {
            let name = match map.get(RESPONSE_FIELD) {
                Some(value) if is_truthy(value) => RESPONSE_FIELD,
                _ => REQUEST_FIELD,
            };
            if let Some(Value::String(s)) = map.get(name) {
                if !s.trim().is_empty() {
                    return Payload::Field {
                        name,
                        envelope: s.clone(),
                    };
                }
            }
        }
        Payload::Raw(input.to_string())
    }

    pub fn envelope(&self) -> &str {
        match self {
            Payload::Field { envelope, .. } => envelope,
            Payload::Raw(envelope) => envelope,
        }
    }
}

#[derive(Serialize)]
struct RequestBody<'a> {
    #[serde(rename = "RequestData")]
    request_data: &'a str,
}

/// Encrypt user input and frame the result.
///
/// Only a truly empty input is refused; whitespace is valid plaintext.
pub fn seal_text(input: &str, key_base64: &str, framing: Framing) -> Result<String> {
    if input.is_empty() || key_base64.trim().is_empty() {
        return Err(empty_input());
    }
    let envelope = codec::encrypt(input, key_base64)?;
    match framing {
        Framing::Raw => Ok(envelope),
        Framing::Json => frame_request(&envelope),
    }
}

/// Extract the envelope from user input, decrypt it and render the plaintext.
pub fn open_text(input: &str, key_base64: &str) -> Result<String> {
    if input.trim().is_empty() || key_base64.trim().is_empty() {
        return Err(empty_input());
    }
    let payload = Payload::parse(input);
    let plaintext = codec::decrypt(payload.envelope(), key_base64)?;
    Ok(render_plaintext(&plaintext))
}

/// Wrap an envelope as `{"RequestData": ...}` with 2-space indentation.
pub fn frame_request(envelope: &str) -> Result<String> {
    serde_json::to_string_pretty(&RequestBody {
        request_data: envelope,
    })
    .map_err(|e| {
        AesboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::InternalInvariant,
            "failed to serialize request payload",
            e,
        )
    })
}

/// Pretty-print plaintext that is JSON; return anything else unchanged.
pub fn render_plaintext(plaintext: &str) -> String {
    serde_json::from_str::<Value>(plaintext)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| plaintext.to_string())
}

/// One-line summary of what the input looks like.
pub fn describe(input: &str, direction: Direction) -> String {
    if input.is_empty() {
        return match direction {
            Direction::Encrypt => "Enter the raw text or JSON to encrypt.".to_string(),
            Direction::Decrypt => "Paste the JSON with 'ResponseData'/'RequestData' \
                                   or just the encrypted string."
                .to_string(),
        };
    }

    match serde_json::from_str::<Value>(input) {
        Ok(value) => {
            let found = [RESPONSE_FIELD, REQUEST_FIELD].into_iter().find_map(|name| {
                match value.get(name) {
                    Some(Value::String(s)) if !s.is_empty() => Some((name, s.chars().count())),
                    _ => None,
                }
            });
            match found {
                Some((name, len)) => format!("Valid JSON detected. {} length: {}", name, len),
                None => {
                    "Valid JSON, but 'ResponseData' or 'RequestData' key is missing.".to_string()
                }
            }
        }
        Err(_) => format!(
            "Plain text input detected. Length: {}",
            input.chars().count()
        ),
    }
}

fn empty_input() -> AesboxError {
    AesboxError::with_kind(
        ErrorCategory::User,
        ErrorKind::EmptyInput,
        "input and key cannot be empty",
    )
}

// JavaScript truthiness.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
