use crate::utils::error::{AppError, Result};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use ring::hmac;
use serde::{Deserialize, Serialize};

/// Hash a login phone number for storage. The phone number doubles as the
/// account password, so it is only ever persisted as an Argon2 hash.
pub fn hash_phone(phone_number: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(phone_number.as_bytes(), &salt)
        .map_err(|e| AppError::Credential {
            message: format!("Failed to hash credential: {}", e),
        })?;
    Ok(hash.to_string())
}

pub fn verify_phone(phone_number: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(phone_number.as_bytes(), &parsed)
        .is_ok()
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub name: String,
    /// Expiry as a unix timestamp (seconds).
    pub exp: i64,
}

/// Issues and verifies bearer tokens of the form
/// `base64url(claims).base64url(hmac_sha256(claims))`, signed with the
/// shared key from configuration.
pub struct TokenSigner {
    key: hmac::Key,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(signing_key: &str, ttl_hours: i64) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, signing_key.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: i64, name: &str) -> Result<String> {
        let claims = Claims {
            user_id,
            name: name.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signature = hmac::sign(&self.key, payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(signature.as_ref());
        Ok(format!("{}.{}", payload, signature))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let invalid = || AppError::Credential {
            message: "Invalid token".to_string(),
        };

        let (payload, signature) = token.split_once('.').ok_or_else(invalid)?;
        let signature_bytes = URL_SAFE_NO_PAD.decode(signature).map_err(|_| invalid())?;
        hmac::verify(&self.key, payload.as_bytes(), &signature_bytes).map_err(|_| invalid())?;

        let claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).map_err(|_| invalid())?)
                .map_err(|_| invalid())?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AppError::Credential {
                message: "Token has expired".to_string(),
            });
        }

        Ok(claims)
    }
}
