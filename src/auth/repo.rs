use std::time::Duration;

use axum::async_trait;
use sqlx::PgPool;
use tokio::time::timeout;

use crate::auth::{
    errors::StoreError,
    repo_types::{NewUser, User},
};

/// Durable email-keyed user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `ConstraintViolation` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    /// Overwrite email, password and name and stamp `updated_at`.
    /// Fails with `NotFound` when `user.id` does not exist.
    async fn update(&self, user: &User) -> Result<User, StoreError>;
    /// Idempotent: deleting an unknown id succeeds.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
    /// Liveness probe used by the health endpoint.
    async fn ping(&self) -> bool;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
    query_timeout: Duration,
    ping_timeout: Duration,
}

impl PgUserStore {
    pub fn new(db: PgPool, query_timeout: Duration, ping_timeout: Duration) -> Self {
        Self {
            db,
            query_timeout,
            ping_timeout,
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password, name, created_at, updated_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .fetch_one(&self.db);
        Ok(timeout(self.query_timeout, query).await??)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, name, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db);
        Ok(timeout(self.query_timeout, query).await??)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db);
        Ok(timeout(self.query_timeout, query).await??)
    }

    async fn update(&self, user: &User) -> Result<User, StoreError> {
        let query = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $1, password = $2, name = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING id, email, password, name, created_at, updated_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.name)
        .bind(user.id)
        .fetch_optional(&self.db);
        timeout(self.query_timeout, query)
            .await??
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let query = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db);
        timeout(self.query_timeout, query).await??;
        Ok(())
    }

    async fn ping(&self) -> bool {
        crate::db::ping(&self.db, self.ping_timeout).await
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryUserStore;
