//! # ladle-auth-jwt
//!
//! Argon2 + HS256 implementation of `AuthProvider`.
//! Password digests use the PHC string format; bearer credentials are
//! short-lived JWTs carrying the user's id, username, and roles.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use ladle_core::error::{AppError, Result};
use ladle_core::models::{Role, User};
use ladle_core::policy::Principal;
use ladle_core::traits::AuthProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token carries. Roles ride along so authorization does not need a
/// user lookup on every request.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    roles: Vec<Role>,
    iat: i64,
    exp: i64,
}

pub struct JwtAuthProvider {
    /// HMAC secret for signing and verification (e.g., from an environment
    /// variable)
    secret: Vec<u8>,
    /// Token lifetime in seconds
    ttl: i64,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, ttl: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        }
    }
}

impl AuthProvider for JwtAuthProvider {
    /// Digests a password with a fresh random salt.
    fn hash_password(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hash error: {e}")))
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    fn verify_password(&self, plaintext: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            roles: user.roles.clone(),
            iat: now,
            exp: now + self.ttl,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| AppError::Internal(format!("token encode error: {e}")))
    }

    /// Anything wrong with the credential (signature, expiry, malformed
    /// subject) collapses into Forbidden; callers never learn which.
    fn verify_token(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map_err(|_| AppError::Forbidden("Forbidden".to_string()))?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Forbidden("Forbidden".to_string()))?;
        Ok(Principal {
            id,
            username: data.claims.username,
            roles: data.claims.roles,
        })
    }
}
