//! Session tokens and their cookie signatures.

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;

const TOKEN_BYTES: usize = 20;
const SIGNATURE_BYTES: usize = 16;

/// Random identifier of one client's session, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("session cookie is not <token>.<signature>")]
    Malformed,
    #[error("session cookie signature mismatch")]
    BadSignature,
}

/// Signs tokens with the site's secret key: the cookie value is
/// `<token>.<signature>`, where the signature is a truncated
/// SHA-256 of key and token.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Arc<[u8]>,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into().into(),
        }
    }

    /// Signer with a fresh random key.
    pub fn random() -> Self {
        let key: [u8; 32] = rand::random();
        Self::new(key.to_vec())
    }

    fn signature(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(token.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..SIGNATURE_BYTES])
    }

    /// Cookie value for `token`.
    pub fn sign(&self, token: &SessionToken) -> String {
        format!("{}.{}", token.0, self.signature(&token.0))
    }

    /// Token carried by a cookie value, if the signature checks out.
    pub fn verify(&self, cookie_value: &str) -> Result<SessionToken, TokenError> {
        let (token, signature) = cookie_value
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        if token.len() != TOKEN_BYTES * 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::Malformed);
        }
        let expected = self.signature(token);
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(SessionToken(token.to_string()))
        } else {
            Err(TokenError::BadSignature)
        }
    }
}
