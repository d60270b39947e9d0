//! Message Gateway Cryptography
//!
//! - **Signature**: SHA-1 over the sorted request parameters
//! - **Codec**: AES-256-CBC with the platform's length-prefixed framing

pub mod codec;
pub mod error;
pub mod signature;

pub use codec::{random_alphanumeric, Decrypted, MessageCodec};
pub use error::{CryptoError, Result};
