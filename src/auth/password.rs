use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

use crate::error::AppError;

lazy_static! {
    /// Verified against when the login email is unknown, so both failure paths cost one argon2 run.
    static ref DUMMY_HASH: Option<String> = hash_password("angletrack-dummy-password").ok();
}

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    if plain.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AppError::Internal(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Errors only when `hash` is not a PHC string; a mismatch is `Ok(false)`.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AppError::Internal(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

pub(crate) fn burn_verify(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}

/// Builds the dummy hash eagerly; call once at startup.
pub fn warm_up() {
    lazy_static::initialize(&DUMMY_HASH);
}

/// Runs an argon2 job on the blocking pool.
pub(crate) async fn off_executor<T, F>(job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job).await.map_err(|e| {
        error!(error = %e, "argon2 task failed");
        AppError::Internal(e.to_string())
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_input_hashes_differently() {
        let a = hash_password("p1").unwrap();
        let b = hash_password("p1").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("p1", &a).unwrap());
        assert!(verify_password("p1", &b).unwrap());
    }

    #[test]
    fn empty_password_is_a_validation_error() {
        assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn dummy_hash_is_available() {
        assert!(DUMMY_HASH.is_some());
        burn_verify("whatever");
    }

    #[test]
    fn warm_up_builds_dummy_hash() {
        warm_up();
        let hash = DUMMY_HASH.as_deref().expect("dummy hash");
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn hashing_runs_off_the_executor() {
        let hash = off_executor(|| hash_password("p1")).await.unwrap();
        let ok = off_executor(move || verify_password("p1", &hash)).await.unwrap();
        assert!(ok);

        let err = off_executor(|| hash_password("")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
