//! aesbox - AES-CBC envelope encryption for RequestData/ResponseData payloads

#![forbid(unsafe_code)]

pub mod codec;
pub mod envelope;
pub mod error;
pub mod file_ops;
pub mod key;
pub mod key_reader;
pub mod payload;
pub mod telemetry;
