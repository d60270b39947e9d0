//! Message Envelope Codec
//!
//! AES-256-CBC with IV = first 16 key bytes. The plaintext is framed as:
//!
//! ```text
//! random(16) || xml_len(4, big-endian) || xml || app_id || padding
//! ```
//!
//! Padding fills up to a multiple of 32 bytes (not the 16-byte AES block),
//! every pad byte holding the pad length. An aligned frame gets a full
//! 32-byte pad block.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::Rng;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-256 key length.
const KEY_LEN: usize = 32;

const IV_LEN: usize = 16;

/// Random prefix at the start of every frame.
pub const RANDOM_LEN: usize = 16;

/// Random prefix plus the 4-byte length field.
const HEADER_LEN: usize = RANDOM_LEN + 4;

/// Padding block size used by the platform.
pub const PAD_BLOCK: usize = 32;

/// Platform keys are 43 characters without `=` and may carry non-zero
/// trailing bits.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Result of decrypting an inbound envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// Application id embedded by the sender.
    pub app_id: String,
    pub xml: String,
}

/// Encrypts and decrypts framed messages for one account key.
#[derive(Clone)]
pub struct MessageCodec {
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl MessageCodec {
    /// Create a codec from the account's base64 key.
    pub fn new(encoded_key: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            KEY_ENGINE
                .decode(encoded_key.trim())
                .map_err(|e| CryptoError::InvalidKey(e.to_string()))?,
        );
        if decoded.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "expected {KEY_LEN} bytes, got {}",
                decoded.len()
            )));
        }

        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&decoded);
        Ok(Self { key })
    }

    fn iv(&self) -> &[u8] {
        &self.key[..IV_LEN]
    }

    /// Frame `xml` for `app_id` behind a random alphanumeric prefix, then
    /// encrypt. Returns base64 ciphertext.
    pub fn encrypt(&self, xml: &str, app_id: &str) -> Result<String> {
        let mut random = [0u8; RANDOM_LEN];
        random.copy_from_slice(random_alphanumeric(RANDOM_LEN).as_bytes());
        self.encrypt_frame(&frame(&random, xml, app_id))
    }

    /// Pad and encrypt an already framed plaintext.
    pub fn encrypt_frame(&self, framed: &[u8]) -> Result<String> {
        self.encrypt_raw(&pad(framed))
    }

    /// Encrypt a buffer that is already a multiple of the AES block size.
    pub fn encrypt_raw(&self, padded: &[u8]) -> Result<String> {
        if padded.len() % IV_LEN != 0 {
            return Err(CryptoError::InvalidCiphertext(format!(
                "plaintext length {} is not block aligned",
                padded.len()
            )));
        }
        let cipher = Aes256CbcEnc::new_from_slices(self.key.as_slice(), self.iv())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<NoPadding>(padded);
        Ok(STANDARD.encode(ciphertext))
    }

    /// Decrypt base64 ciphertext without removing padding.
    pub fn decrypt_raw(&self, ciphertext: &str) -> Result<Vec<u8>> {
        let data = STANDARD.decode(ciphertext.trim())?;
        if data.is_empty() || data.len() % IV_LEN != 0 {
            return Err(CryptoError::InvalidCiphertext(format!(
                "length {} is not a positive multiple of {IV_LEN}",
                data.len()
            )));
        }
        let cipher = Aes256CbcDec::new_from_slices(self.key.as_slice(), self.iv())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        cipher
            .decrypt_padded_vec_mut::<NoPadding>(&data)
            .map_err(|e| CryptoError::InvalidCiphertext(e.to_string()))
    }

    /// Decrypt and unframe an inbound envelope.
    ///
    /// The caller must compare [`Decrypted::app_id`] against its own app id.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Decrypted> {
        let plaintext = Zeroizing::new(self.decrypt_raw(ciphertext)?);
        unframe(&plaintext)
    }
}

impl std::fmt::Debug for MessageCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCodec").finish_non_exhaustive()
    }
}

/// Build `random || len || xml || app_id` (unpadded).
pub fn frame(random: &[u8; RANDOM_LEN], xml: &str, app_id: &str) -> Vec<u8> {
    let xml = xml.as_bytes();
    let mut out = Vec::with_capacity(HEADER_LEN + xml.len() + app_id.len() + PAD_BLOCK);
    out.extend_from_slice(random);
    out.extend_from_slice(&(xml.len() as u32).to_be_bytes());
    out.extend_from_slice(xml);
    out.extend_from_slice(app_id.as_bytes());
    out
}

/// Pad to a multiple of [`PAD_BLOCK`]; each pad byte is the pad length.
pub fn pad(framed: &[u8]) -> Vec<u8> {
    let pad_len = PAD_BLOCK - framed.len() % PAD_BLOCK;
    let mut out = Vec::with_capacity(framed.len() + pad_len);
    out.extend_from_slice(framed);
    out.resize(framed.len() + pad_len, pad_len as u8);
    out
}

/// Strip padding and split a decrypted buffer into app id and XML.
///
/// A final byte outside `1..=32` means no padding was stripped.
pub fn unframe(plaintext: &[u8]) -> Result<Decrypted> {
    let last = *plaintext
        .last()
        .ok_or(CryptoError::InvalidFrame("empty plaintext"))? as usize;
    let pad_len = if (1..=PAD_BLOCK).contains(&last) { last } else { 0 };
    let content = plaintext
        .len()
        .checked_sub(pad_len)
        .map(|end| &plaintext[..end])
        .ok_or(CryptoError::InvalidFrame("padding longer than plaintext"))?;

    if content.len() < HEADER_LEN {
        return Err(CryptoError::InvalidFrame("shorter than frame header"));
    }

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&content[RANDOM_LEN..HEADER_LEN]);
    let xml_len = u32::from_be_bytes(len_bytes) as usize;
    let xml_end = HEADER_LEN
        .checked_add(xml_len)
        .filter(|end| *end <= content.len())
        .ok_or(CryptoError::InvalidFrame("declared length exceeds payload"))?;

    let xml = std::str::from_utf8(&content[HEADER_LEN..xml_end])
        .map_err(|_| CryptoError::InvalidUtf8)?;
    let app_id =
        std::str::from_utf8(&content[xml_end..]).map_err(|_| CryptoError::InvalidUtf8)?;

    Ok(Decrypted {
        app_id: app_id.to_string(),
        xml: xml.to_string(),
    })
}

/// Random string of ASCII letters and digits.
pub fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
