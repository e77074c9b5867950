//! Signed Session Tokens
//!
//! The session cookie carries `"{session_id}.{signature}"` where the
//! signature is HMAC-SHA256 over the UUID string, base64url-encoded
//! without padding. A forged or truncated cookie fails verification before
//! any store lookup happens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use kernel::id::SessionId;
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Sign a session id into a cookie value.
pub fn sign(session_id: &SessionId, secret: &[u8; 32]) -> String {
    let session_id = session_id.to_string();

    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(session_id.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("{}.{}", session_id, URL_SAFE_NO_PAD.encode(signature))
}

/// Parse and verify a session cookie value.
pub fn verify(token: &str, secret: &[u8; 32]) -> AuthResult<SessionId> {
    let (session_id_str, signature_b64) =
        token.split_once('.').ok_or(AuthError::SessionInvalid)?;

    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(session_id_str.as_bytes());

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::SessionInvalid)?;

    mac.verify_slice(&signature)
        .map_err(|_| AuthError::SessionInvalid)?;

    session_id_str.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_sign_verify_roundtrip() {
        let session_id = SessionId::new();
        let token = sign(&session_id, &SECRET);
        assert_eq!(verify(&token, &SECRET).unwrap(), session_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(&SessionId::new(), &SECRET);
        assert!(verify(&token, &[8u8; 32]).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = sign(&SessionId::new(), &SECRET);

        // Swap in a different session id, keep the signature.
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!("{}.{}", SessionId::new(), sig);
        assert!(verify(&forged, &SECRET).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify("", &SECRET).is_err());
        assert!(verify("no-dot-here", &SECRET).is_err());
        assert!(verify("abc.!!!not-base64!!!", &SECRET).is_err());
    }
}
