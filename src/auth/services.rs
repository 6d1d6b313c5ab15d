//! Turns raw credentials into stored hashes and identities into tokens.
//!
//! The authority holds no user data between calls. Every `User` it hands back
//! has had its password hash cleared.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{
    claims::Claims,
    errors::{AuthError, StoreError},
    jwt::JwtKeys,
    password::{dummy_hash, hash_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, User},
};

/// A freshly issued token and the public view of its subject.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct Authority {
    store: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl Authority {
    pub fn new(store: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    /// Fails with `AlreadyExists` when the email is taken, including when a
    /// concurrent registration wins the insert: `StoreError::ConstraintViolation`
    /// from `create` never escapes this call.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, AuthError> {
        if self.store.get_by_email(email).await?.is_some() {
            warn!("email already registered");
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = hash_blocking(password.to_owned()).await?;

        // A concurrent registration may win between the lookup and the insert;
        // the unique index decides.
        let user = match self
            .store
            .create(NewUser {
                email: email.to_owned(),
                name: name.to_owned(),
                password_hash,
            })
            .await
        {
            Ok(u) => u,
            Err(StoreError::ConstraintViolation) => {
                warn!("email registered concurrently");
                return Err(AuthError::AlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        let token = self.issue_token(user.id, &user.email)?;
        info!(user_id = user.id, "user registered");
        Ok(Session {
            token,
            user: user.without_password(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(user) = self.store.get_by_email(email).await? else {
            // Pay the same argon2 cost as a wrong password so response time
            // does not reveal which emails are registered.
            let _ = verify_blocking(password.to_owned(), dummy_hash().to_owned()).await;
            warn!("login unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(password.to_owned(), user.password.clone()).await? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.issue_token(user.id, &user.email)?;
        info!(user_id = user.id, "user logged in");
        Ok(Session {
            token,
            user: user.without_password(),
        })
    }

    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        self.keys.issue(user_id, email)
    }

    /// Accepts a bare token or an `Authorization` header value.
    pub fn verify_token(&self, raw: Option<&str>) -> Result<Claims, AuthError> {
        let raw = raw.unwrap_or_default();
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.keys.verify(token)
    }
}

async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
}
