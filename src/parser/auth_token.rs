//! Unwraps the encrypted token returned by the issuance service.
//!
//! Token layout: 64 hex chars of `SHA-256(plaintext)` followed by the URL-safe
//! base64 AES-256-CBC ciphertext. Key and IV are slices of the hex SHA-256 of
//! `instanceId_region_userName`; the plaintext is a 4 byte prefix followed by a
//! protobuf encoded [`AuthTokenInfo`].

use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use prost::Message;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::parser::payload::AuthTokenInfo;
use crate::utils::constants::DELIMITER;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const HASH_HEX_LEN: usize = 64;
const BLOCK_SIZE: usize = 16;
const KEY_RANGE: std::ops::Range<usize> = 0..32;
const IV_RANGE: std::ops::Range<usize> = 33..49;
const PAYLOAD_PREFIX_LEN: usize = 4;

#[derive(Debug, Error)]
pub enum UnwrapError {
    #[error("param empty")]
    EmptyParam,
    #[error("token is too short or not valid text at the hash boundary")]
    MalformedToken,
    #[error("invalid base64 ciphertext: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("ciphertext too short")]
    CiphertextTooShort,
    #[error("ciphertext is not a whole number of blocks")]
    Decrypt,
    #[error("invalid padding size")]
    InvalidPaddingSize,
    #[error("invalid padding")]
    InvalidPadding,
    #[error("token hash does not match its content")]
    HashMismatch,
    #[error("decrypted token is shorter than its prefix")]
    PayloadTooShort,
    #[error("failed to parse AuthTokenInfo: {0}")]
    Payload(#[from] prost::DecodeError),
}

/// Decrypt `token` for the given identity, verify it and decode its payload.
pub fn parse_auth_token(
    instance_id: &str,
    region: &str,
    user_name: &str,
    token: &str,
) -> Result<AuthTokenInfo, UnwrapError> {
    if instance_id.is_empty() || region.is_empty() || user_name.is_empty() || token.is_empty() {
        return Err(UnwrapError::EmptyParam);
    }

    let seed = sha256_hex(format!("{instance_id}{DELIMITER}{region}{DELIMITER}{user_name}").as_bytes());
    let key = &seed.as_bytes()[KEY_RANGE];
    let iv = &seed.as_bytes()[IV_RANGE];

    if token.len() <= HASH_HEX_LEN || !token.is_char_boundary(HASH_HEX_LEN) {
        return Err(UnwrapError::MalformedToken);
    }
    let (expected_hash, body) = token.split_at(HASH_HEX_LEN);

    let plaintext = decrypt(body, key, iv)?;

    if sha256_hex(&plaintext) != expected_hash {
        return Err(UnwrapError::HashMismatch);
    }

    decode_payload(&plaintext)
}

fn decode_payload(plaintext: &[u8]) -> Result<AuthTokenInfo, UnwrapError> {
    let body = plaintext
        .get(PAYLOAD_PREFIX_LEN..)
        .ok_or(UnwrapError::PayloadTooShort)?;
    Ok(AuthTokenInfo::decode(body)?)
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn decrypt(body: &str, key: &[u8], iv: &[u8]) -> Result<Vec<u8>, UnwrapError> {
    let ciphertext = url_safe_decode(body)?;
    if ciphertext.len() < BLOCK_SIZE {
        return Err(UnwrapError::CiphertextTooShort);
    }

    let padded = Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| UnwrapError::Decrypt)?
        .decrypt_padded_vec_mut::<NoPadding>(&ciphertext)
        .map_err(|_| UnwrapError::Decrypt)?;

    unpad(padded)
}

/// URL-safe alphabet, padding optional.
fn url_safe_decode(data: &str) -> Result<Vec<u8>, UnwrapError> {
    let mut normalized = data.replace('-', "+").replace('_', "/");
    let rem = normalized.len() % 4;
    if rem != 0 {
        normalized.push_str(&"=".repeat(4 - rem));
    }
    Ok(STANDARD.decode(normalized)?)
}

fn unpad(mut data: Vec<u8>) -> Result<Vec<u8>, UnwrapError> {
    let Some(&last) = data.last() else {
        return Err(UnwrapError::InvalidPaddingSize);
    };
    let padding = last as usize;
    if padding == 0 || padding > BLOCK_SIZE || padding > data.len() {
        return Err(UnwrapError::InvalidPaddingSize);
    }
    if data[data.len() - padding..].iter().any(|&b| b != last) {
        return Err(UnwrapError::InvalidPadding);
    }
    data.truncate(data.len() - padding);
    Ok(data)
}
