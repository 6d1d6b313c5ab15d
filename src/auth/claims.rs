use serde::{Deserialize, Serialize};

/// JWT payload identifying a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userID")]
    pub user_id: i64, // subject id
    pub email: String, // subject email
    pub exp: u64,      // expires at (unix timestamp)
}
