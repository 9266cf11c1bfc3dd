//! Authentication: password hashing and bearer tokens.
//!
//! Passwords are stored as salted, iterated SHA-256 digests. Tokens are
//! compact HMAC-SHA256-signed blobs (`base64(claims).base64(mac)`) carrying
//! the user id and an expiry; the server keeps no session state, so a token
//! is valid until it expires or the signing secret rotates.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::time;
use crate::users::User;

type HmacSha256 = Hmac<Sha256>;

/// Hash format version tag, kept in the stored string so the scheme can
/// be migrated later without guessing.
const HASH_VERSION: &str = "v1";

/// Extra SHA-256 rounds applied after the salted digest.
const HASH_ITERATIONS: u32 = 10_000;

// ── Passwords ─────────────────────────────────────────────────────────────

/// Hash a password with a fresh random salt.
/// Output format: `v1$<salt hex>$<digest hex>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = digest_password(&salt, password);
    format!("{}${}${}", HASH_VERSION, hex::encode(salt), hex::encode(digest))
}

/// Verify a password against a stored hash. Malformed stored hashes
/// simply fail verification.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(version), Some(salt_hex), Some(digest_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if version != HASH_VERSION {
        return false;
    }
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    digest_password(&salt, password) == expected
}

fn digest_password(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();
    for _ in 0..HASH_ITERATIONS {
        digest = Sha256::digest(&digest);
    }
    digest.to_vec()
}

// ── Tokens ────────────────────────────────────────────────────────────────

/// What a token asserts: which user, until when.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Arc<Vec<u8>>,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        Self {
            secret: Arc::new(secret.into()),
            ttl_secs,
        }
    }

    /// Mint a token for a user, valid for the configured TTL.
    pub fn issue(&self, user_id: Uuid) -> String {
        let claims = Claims {
            sub: user_id,
            exp: time::now_timestamp() + self.ttl_secs,
        };
        // Claims are a plain struct with no fallible fields.
        let payload = serde_json::to_vec(&claims).expect("claims serialize to JSON");
        let payload_b64 = URL_SAFE_NO_PAD.encode(&payload);
        let mac = self.mac_over(payload_b64.as_bytes());
        format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(mac))
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<Uuid> {
        let (payload_b64, mac_b64) = token.split_once('.').ok_or(Error::InvalidToken)?;

        let mac = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| Error::InvalidToken)?;
        let mut verifier = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| Error::Internal("HMAC key setup failed".into()))?;
        verifier.update(payload_b64.as_bytes());
        verifier.verify_slice(&mac).map_err(|_| Error::InvalidToken)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| Error::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| Error::InvalidToken)?;

        if claims.exp <= time::now_timestamp() {
            return Err(Error::InvalidToken);
        }
        Ok(claims.sub)
    }

    fn mac_over(&self, data: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length; new_from_slice cannot fail.
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC key");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

// ── Extractor ─────────────────────────────────────────────────────────────

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header before any handler logic runs. Carries the live user document;
/// a valid token for a vanished account is rejected.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(Error::MissingToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(Error::MissingToken)?;

        let user_id = state.tokens.verify(token)?;
        let user = state.store.get_user(&user_id).ok_or(Error::InvalidToken)?;
        Ok(AuthUser(user))
    }
}
