//! The authentication provider: salted password hashing and HS256 bearer
//! tokens.
//!
//! The rest of the module treats this as an opaque boundary - handlers
//! receive an already-resolved identity and services never look at
//! passwords or tokens beyond the stored hash and version counter.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Salted SHA-256 password hashing. Hashes are stored as
/// `<salt-hex>$<digest-hex>`.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    #[must_use]
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; 16];
        rand::rng().fill_bytes(&mut salt);
        format!("{}${}", hex::encode(salt), digest_hex(&salt, password))
    }

    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt_hex, digest)) = stored.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        digest_hex(&salt, password) == digest
    }
}

fn digest_hex(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Claims carried by an access token. `ver` pins the token to the user's
/// token version at issue time; a logout bump strands older tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub ver: u64,
    pub exp: i64,
}

/// Configuration for token issuance.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: "insecure-development-secret".to_owned(),
            token_ttl_minutes: 30,
        }
    }
}

/// Issues and validates HS256 bearer tokens.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::minutes(config.token_ttl_minutes),
        }
    }

    /// Issue a token for the given identity and token version.
    ///
    /// # Errors
    /// `Storage` when encoding fails (malformed key material).
    pub fn issue(&self, user_id: Uuid, token_version: u64) -> Result<String, DomainError> {
        let claims = Claims {
            sub: user_id,
            ver: token_version,
            exp: (OffsetDateTime::now_utc() + self.ttl).unix_timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| DomainError::storage(format!("token encoding failed: {e}")))
    }

    /// Validate a bearer token and return its claims.
    ///
    /// # Errors
    /// `Unauthorized` for anything wrong with the token: signature,
    /// expiry, shape.
    pub fn decode(&self, token: &str) -> Result<Claims, DomainError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::unauthorized("invalid authentication credentials"))
    }
}
