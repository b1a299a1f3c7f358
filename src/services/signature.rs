//! Webhook signature verification
//!
//! HMAC-SHA256 over the raw request bytes, hex-encoded. Verification must
//! run on the bytes as received: re-serializing the JSON can reorder keys
//! and invalidate a legitimate signature.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature against the raw payload.
///
/// A missing/empty signature or secret is never valid. The comparison is
/// constant-time; it never short-circuits on the first differing byte.
/// An optional `sha256=` prefix on the header value is accepted.
pub fn verify(signature: &str, payload: &[u8], secret: &str) -> bool {
    if signature.is_empty() || secret.is_empty() {
        return false;
    }

    let supplied = signature.strip_prefix("sha256=").unwrap_or(signature);

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    let supplied = supplied.to_ascii_lowercase();
    expected.as_bytes().ct_eq(supplied.as_bytes()).into()
}

/// Compute the hex signature for a payload. Used by tests and outbound
/// webhook simulation tooling.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"order_id":"ORD1","commission":7.5}"#;
        let sig = sign(payload, "topsecret");
        assert!(verify(&sig, payload, "topsecret"));
    }

    #[test]
    fn prefix_and_case_are_tolerated() {
        let payload = b"payload";
        let sig = sign(payload, "s3cret");
        assert!(verify(&format!("sha256={}", sig), payload, "s3cret"));
        assert!(verify(&sig.to_uppercase(), payload, "s3cret"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = b"payload";
        let sig = sign(payload, "secret-a");
        assert!(!verify(&sig, payload, "secret-b"));
    }

    #[test]
    fn modified_payload_is_rejected() {
        let sig = sign(b"untouched", "secret");
        assert!(!verify(&sig, b"tampered", "secret"));
    }

    #[test]
    fn empty_signature_or_secret_is_rejected() {
        let payload = b"payload";
        assert!(!verify("", payload, "secret"));
        let sig = sign(payload, "secret");
        assert!(!verify(&sig, payload, ""));
    }

    #[test]
    fn malformed_signature_is_rejected() {
        assert!(!verify("not-hex-at-all", b"payload", "secret"));
        assert!(!verify("deadbeef", b"payload", "secret"));
    }
}
