use serde::{Deserialize, Serialize};

/// User record as persisted in the users container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,         // unique key, stored lower-cased
    pub password_hash: String, // Argon2 PHC string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
}
