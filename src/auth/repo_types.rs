use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                      // assigned by the store
    pub email: String,                // unique
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,             // argon2 PHC string; cleared before leaving the authority
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Drop the password hash so the record is safe to hand to a caller.
    pub fn without_password(mut self) -> Self {
        self.password.clear();
        self
    }
}

/// Fields needed to insert a user. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample() -> User {
        User {
            id: 7,
            email: "a@b.com".into(),
            password: "$argon2id$v=19$...".into(),
            name: "Ann".into(),
            created_at: datetime!(2024-01-02 03:04:05 UTC),
            updated_at: datetime!(2024-01-02 03:04:05 UTC),
        }
    }

    #[test]
    fn password_is_omitted_once_cleared() {
        let json = serde_json::to_value(sample().without_password()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["created_at"], "2024-01-02T03:04:05Z");
        assert_eq!(json["updated_at"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn public_json_round_trips() {
        let user = sample().without_password();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
