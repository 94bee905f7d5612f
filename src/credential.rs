//! Password hashing and token issuance for accounts

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Session-token claims. `exp` is absent unless the caller asked for an
/// expiring token (password reset does).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: u64,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Stateless credential primitives: Argon2id password hashing and
/// HS256-signed tokens. Holds only the signing secret; verification needs
/// no shared mutable state.
#[derive(Clone)]
pub struct CredentialService {
    secret: Vec<u8>,
}

impl CredentialService {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    /// Hash a password using Argon2id with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| ApiError::internal("password hashing failed", e))
    }

    /// Verify a password against a stored hash. Comparison happens inside
    /// the hash primitive, never as string equality.
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Issue a session token binding to an account id, with no expiry.
    pub fn issue_session_token(&self, account_id: u64) -> Result<String, ApiError> {
        self.sign(&Claims {
            sub: account_id,
            iat: Utc::now().timestamp(),
            exp: None,
        })
    }

    /// Issue a signed token that must be rejected after `ttl_secs`, plus
    /// the wall-clock expiry itself.
    pub fn issue_expiring_token(
        &self,
        account_id: u64,
        ttl_secs: i64,
    ) -> Result<(String, DateTime<Utc>), ApiError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(ttl_secs);
        let token = self.sign(&Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: Some(expires_at.timestamp()),
        })?;
        Ok((token, expires_at))
    }

    /// Cryptographically random opaque token for one-time confirmation
    /// purposes (verification, password reset).
    pub fn issue_opaque_token(&self) -> String {
        let bytes: [u8; 32] = rand::random();
        hex::encode(bytes)
    }

    /// Verify a session token's signature (and expiry, when present) and
    /// return the account id it binds to.
    pub fn verify_session_token(&self, token: &str) -> Result<u64, ApiError> {
        let claims = self.decode(token)?;
        if let Some(exp) = claims.exp {
            if exp <= Utc::now().timestamp() {
                return Err(ApiError::Expired);
            }
        }
        Ok(claims.sub)
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        let header = TokenHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| ApiError::internal("token header serialization failed", e))?;
        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| ApiError::internal("token claims serialization failed", e))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&header_json),
            URL_SAFE_NO_PAD.encode(&claims_json)
        );
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| ApiError::internal("invalid HMAC key", e))?;
        mac.update(signing_input.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, sig))
    }

    fn decode(&self, token: &str) -> Result<Claims, ApiError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ApiError::InvalidCredentials);
        };

        let header_raw = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| ApiError::InvalidCredentials)?;
        let header: TokenHeader =
            serde_json::from_slice(&header_raw).map_err(|_| ApiError::InvalidCredentials)?;
        if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
            return Err(ApiError::InvalidCredentials);
        }

        let signing_input = format!("{}.{}", header_b64, claims_b64);
        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| ApiError::InvalidCredentials)?;
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| ApiError::internal("invalid HMAC key", e))?;
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| ApiError::InvalidCredentials)?;

        let claims_raw = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .map_err(|_| ApiError::InvalidCredentials)?;
        serde_json::from_slice(&claims_raw).map_err(|_| ApiError::InvalidCredentials)
    }
}
