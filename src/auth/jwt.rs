use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    auth::{claims::Claims, errors::AuthError},
    config::JwtConfig,
};

/// Every token expires exactly this long after issuance.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// HS256 signing and verification keys derived from the process secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::from_secret(cfg.secret.as_bytes())
    }

    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: TOKEN_TTL,
        }
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        self.issue_at(user_id, email, OffsetDateTime::now_utc())
    }

    /// Sign claims as if issued at `now`.
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<String, AuthError> {
        let exp = now + self.ttl;
        let claims = Claims {
            user_id,
            email: email.to_owned(),
            exp: exp.unix_timestamp().max(0) as u64,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Bad signature, malformed input and expiry all collapse into
    /// `InvalidToken`; the cause is only logged.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(reason = ?e.kind(), "jwt rejected");
            AuthError::InvalidToken
        })?;
        debug!(user_id = data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration as TimeDuration;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
        })
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(42, "a@b.com").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn expiry_is_exactly_one_day_after_issue() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc();
        let token = keys.issue_at(1, "a@b.com", now).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp as i64, now.unix_timestamp() + 86_400);
    }

    #[test]
    fn token_is_deterministic_for_same_inputs() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc();
        assert_eq!(
            keys.issue_at(5, "x@y.com", now).unwrap(),
            keys.issue_at(5, "x@y.com", now).unwrap()
        );
    }

    #[test]
    fn claims_use_wire_field_names() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(9, "a@b.com").unwrap();
        let claims = keys.verify(&token).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userID"], 9);
        assert_eq!(json["email"], "a@b.com");
        assert!(json["exp"].is_u64());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(25);
        let token = keys.issue_at(1, "a@b.com", issued).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let ours = make_keys("same-payload-secret");
        let theirs = make_keys("some-other-secret");
        let now = OffsetDateTime::now_utc();
        let good = ours.issue_at(1, "a@b.com", now).unwrap();
        let forged = theirs.issue_at(1, "a@b.com", now).unwrap();

        // Keep our header and payload, splice in the other signature.
        let (body, _) = good.rsplit_once('.').unwrap();
        let (_, sig) = forged.rsplit_once('.').unwrap();
        let tampered = format!("{body}.{sig}");

        assert!(matches!(ours.verify(&tampered), Err(AuthError::InvalidToken)));
        assert!(matches!(ours.verify(&forged), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret");
        for junk in ["abc", "a.b.c", "...", "Bearer"] {
            assert!(matches!(keys.verify(junk), Err(AuthError::InvalidToken)));
        }
    }
}
