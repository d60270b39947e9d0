//! Crypto Error Types

use thiserror::Error;

/// Errors from key handling, encryption and frame decoding.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid AES key: {0}")]
    InvalidKey(String),

    #[error("Base64 decoding failed: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("Invalid message frame: {0}")]
    InvalidFrame(&'static str),

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,
}

pub type Result<T> = std::result::Result<T, CryptoError>;
