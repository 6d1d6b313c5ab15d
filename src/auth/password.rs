use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::auth::errors::AuthError;

/// Argon2id with the crate's default cost. The PHC output carries its own
/// salt and parameters, so nothing else needs storing.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AuthError::HashingFailure(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a PHC string.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AuthError::HashingFailure(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// A real PHC string for a password nobody knows. Verifying against it costs
/// the same as verifying against a stored hash.
pub fn dummy_hash() -> &'static str {
    lazy_static! {
        static ref DUMMY_HASH: String =
            hash_password("authsvc-unmatched-credential").unwrap_or_default();
    }
    &DUMMY_HASH
}
