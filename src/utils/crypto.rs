//! Cryptographic utilities for API signing

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

use crate::errors::{CcxtError, CcxtResult};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

fn key_error(err: hmac::digest::InvalidLength) -> CcxtError {
    CcxtError::AuthenticationError {
        message: format!("unusable signing key: {err}"),
    }
}

/// HMAC-SHA256 서명 생성
pub fn hmac_sha256(secret: &[u8], message: &[u8]) -> CcxtResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(key_error)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC-SHA256 서명을 hex 문자열로 반환
pub fn hmac_sha256_hex(secret: &str, message: &str) -> CcxtResult<String> {
    hmac_sha256(secret.as_bytes(), message.as_bytes()).map(hex::encode)
}

/// HMAC-SHA512 서명 생성
pub fn hmac_sha512(secret: &[u8], message: &[u8]) -> CcxtResult<Vec<u8>> {
    let mut mac = HmacSha512::new_from_slice(secret).map_err(key_error)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC-SHA512 서명을 hex 문자열로 반환
pub fn hmac_sha512_hex(secret: &str, message: &str) -> CcxtResult<String> {
    hmac_sha512(secret.as_bytes(), message.as_bytes()).map(hex::encode)
}

/// Base64 인코딩
pub fn base64_encode(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

/// Base64 디코딩
pub fn base64_decode(data: &str) -> CcxtResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| CcxtError::BadResponse {
            message: format!("invalid base64: {e}"),
        })
}
