use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::{
    claims::Identity,
    dto::{LoginRequest, SignupRequest},
    password::{burn_verify, hash_password, off_executor, verify_password},
    repo_types::UserRecord,
};
use crate::error::AppError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

/// Creates the user record. No token is issued; login is a separate step.
pub async fn signup(state: &AppState, req: SignupRequest) -> Result<(), AppError> {
    let name = required(req.name, "name")?.trim().to_string();
    let email = normalize_email(&required(req.email, "email")?);
    let password = required(req.password, "password")?;

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    // Fast path; `create` repeats this check under the store's write lock.
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = off_executor(move || hash_password(&password)).await?;
    state
        .users
        .create(UserRecord {
            name,
            email: email.clone(),
            password_hash,
            goal: None,
        })
        .await?;

    info!(email = %email, "user registered");
    Ok(())
}

/// Unknown email and wrong password both yield [`AppError::InvalidCredentials`].
pub async fn login(state: &AppState, req: LoginRequest) -> Result<String, AppError> {
    let email = normalize_email(&required(req.email, "email")?);
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("password is required".into()))?;

    let Some(user) = state.users.find_by_email(&email).await? else {
        off_executor(move || {
            burn_verify(&password);
            Ok(())
        })
        .await?;
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let hash = user.password_hash.clone();
    if !off_executor(move || verify_password(&password, &hash)).await? {
        warn!(email = %email, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.issue(&Identity { email: user.email })?;
    info!(email = %email, "user logged in");
    Ok(token)
}
