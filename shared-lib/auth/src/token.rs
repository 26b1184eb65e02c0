//! Token encoding and verification.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use error::AuthError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::claims::{Claims, EXPIRES_AT, ISSUED_AT};
use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

fn new_mac(secret: &str) -> Result<HmacSha256, hmac::digest::InvalidLength> {
    HmacSha256::new_from_slice(secret.as_bytes())
}

/// Encode claims into a signed token.
///
/// The claims are serialized as compact JSON with sorted keys, so equal claim
/// sets always produce the same token.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    claims.validate()?;

    let raw = serde_json::to_vec(claims).map_err(|e| {
        tracing::error!("Failed to serialize claims: {}", e);
        AuthError::TokenCreationFailed
    })?;

    let mut mac = new_mac(secret).map_err(|e| {
        tracing::error!("Failed to create HMAC key: {}", e);
        AuthError::TokenCreationFailed
    })?;
    mac.update(&raw);
    let signature = mac.finalize().into_bytes();

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&raw),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Decode and verify a token.
///
/// Every failure is reported as [`AuthError::InvalidToken`].
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    check_token(token, secret, chrono::Utc::now().timestamp()).map_err(|reason| {
        tracing::debug!("Rejected token: {}", reason);
        AuthError::InvalidToken
    })
}

fn check_token(token: &str, secret: &str, now: i64) -> Result<Claims, &'static str> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or("missing separator")?;

    let raw = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| "payload is not base64url")?;
    let signature = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|_| "signature is not base64url")?;

    let mut mac = new_mac(secret).map_err(|_| "bad key")?;
    mac.update(&raw);
    // verify_slice compares in constant time
    mac.verify_slice(&signature)
        .map_err(|_| "signature mismatch")?;

    let claims: Claims = serde_json::from_slice(&raw).map_err(|_| "payload is not a JSON object")?;

    if claims.malformed_time_claim().is_some() {
        return Err("malformed timestamp");
    }
    if claims.is_expired_at(now) {
        return Err("expired");
    }

    Ok(claims)
}

/// Issues and verifies tokens with an injected secret.
#[derive(Clone)]
pub struct TokenService {
    config: AuthConfig,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Sign a claim set.
    ///
    /// With a TTL configured, `iat` and `exp` are stamped before signing.
    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        match self.config.token_ttl_secs {
            Some(ttl) => {
                let now = chrono::Utc::now().timestamp();
                let expires = now
                    .checked_add(ttl)
                    .filter(|_| ttl > 0)
                    .ok_or_else(|| {
                        tracing::error!("Token TTL {} is out of range", ttl);
                        AuthError::TokenCreationFailed
                    })?;
                let stamped = claims
                    .clone()
                    .with(ISSUED_AT, now)
                    .with(EXPIRES_AT, expires);
                encode_token(&stamped, &self.config.secret)
            }
            None => encode_token(claims, &self.config.secret),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode_token(token, &self.config.secret)
    }

    /// Verify the value of an `Authorization` header.
    ///
    /// A missing header or a non-bearer scheme is `Unauthorized`; a bearer
    /// token that fails verification is `InvalidToken`.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::Unauthorized)?;
        let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::Unauthorized)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::Unauthorized);
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::Unauthorized);
        }
        self.verify(token)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .finish()
    }
}
