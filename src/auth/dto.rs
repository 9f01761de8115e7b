use serde::{Deserialize, Serialize};

/// Request body for signup. Fields are optional so absence maps to a validation error.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
