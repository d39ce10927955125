//! HMAC-SHA256 verification of gateway callback signatures.
//!
//! The gateway signs the raw callback body with the shared webhook secret
//! and sends the hex digest in the `X-Gateway-Signature` header. An
//! unverifiable callback is rejected before any JSON parsing.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex signature for a payload. Used by tests to produce
/// valid callbacks.
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    hex_encode(&mac.finalize().into_bytes())
}

/// Verify a hex signature against a payload. Constant-time on the MAC
/// comparison.
pub fn verify(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Some(signature) = hex_decode(signature_hex) else {
        return false;
    };
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let sig = sign("secret", b"payload");
        assert!(verify("secret", b"payload", &sig));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = sign("secret", b"payload");
        assert!(!verify("other", b"payload", &sig));
    }

    #[test]
    fn tampered_body_fails() {
        let sig = sign("secret", b"payload");
        assert!(!verify("secret", b"payload2", &sig));
    }

    #[test]
    fn garbage_signature_fails() {
        assert!(!verify("secret", b"payload", "not-hex"));
        assert!(!verify("secret", b"payload", "abc"));
    }
}
