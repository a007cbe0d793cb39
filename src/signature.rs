//! `X-Hub-Signature-256` verification.
//!
//! The digest is an HMAC-SHA256 of the raw request body keyed with the
//! project's webhook secret, sent as `sha256=<hex>`. It must be computed over
//! the bytes as received; re-serialized JSON is not byte-stable.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// How a delivery was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// The project has no secret; anyone can post deliveries for it.
    SkippedNoSecret,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,
    #[error("signature header is not a sha256 hex digest")]
    Malformed,
    #[error("signature mismatch")]
    Mismatch,
}

pub fn verify_signature(
    secret: Option<&str>,
    header: Option<&str>,
    body: &[u8],
) -> Result<Verification, SignatureError> {
    let Some(secret) = secret.filter(|secret| !secret.is_empty()) else {
        return Ok(Verification::SkippedNoSecret);
    };

    let digest = header
        .ok_or(SignatureError::Missing)?
        .trim()
        .strip_prefix(SIGNATURE_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(digest).map_err(|_| SignatureError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Mismatch)?;
    mac.update(body);

    // constant time
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)?;

    Ok(Verification::Verified)
}
