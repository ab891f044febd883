//! Shopify webhook signatures: base64 HMAC-SHA256 of the raw body.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-shopify-hmac-sha256";

/// Base64 HMAC-SHA256 of `body` keyed by `secret`.
#[must_use]
pub fn compute_signature(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Constant-time check of `provided` against the signature of `body`.
/// A length mismatch is a plain rejection.
#[must_use]
pub fn verify_signature(secret: &str, body: &[u8], provided: &str) -> bool {
    let Some(expected) = compute_signature(secret, body) else {
        return false;
    };
    expected.as_bytes().ct_eq(provided.trim().as_bytes()).into()
}
