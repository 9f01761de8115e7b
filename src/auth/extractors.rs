use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{claims::Identity, jwt::JwtKeys, jwt::TokenError};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer credential was presented.
    #[error("{0}")]
    Unauthenticated(&'static str),
    /// A credential was presented but did not verify.
    #[error(transparent)]
    Forbidden(TokenError),
}

/// Resolves the `Authorization` header value into an [`Identity`].
///
/// Pure: looks only at the header and the keys, never at the stores.
pub fn authenticate(keys: &JwtKeys, header: Option<&str>) -> Result<Identity, AuthError> {
    let header = header.ok_or(AuthError::Unauthenticated("missing Authorization header"))?;

    // Expect "Bearer <token>"
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Unauthenticated("invalid auth scheme"))?;

    keys.verify(token).map_err(AuthError::Forbidden)
}

/// Extractor running [`authenticate`] on the request headers.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        // Non-ASCII header values count as absent.
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match authenticate(&keys, header) {
            Ok(identity) => Ok(AuthUser(identity)),
            Err(e) => {
                warn!(error = %e, "request rejected by auth gate");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    fn keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: "gate-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 60,
        })
        .unwrap()
    }

    fn bob() -> Identity {
        Identity {
            email: "bob@example.com".into(),
        }
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        assert!(matches!(
            authenticate(&keys(), None),
            Err(AuthError::Unauthenticated(_))
        ));
    }

    #[test]
    fn wrong_scheme_is_unauthenticated() {
        let token = keys().issue(&bob()).unwrap();
        for header in [token.clone(), format!("Basic {token}"), "Bearer ".to_string()] {
            assert!(matches!(
                authenticate(&keys(), Some(header.as_str())),
                Err(AuthError::Unauthenticated(_))
            ));
        }
    }

    #[test]
    fn bad_token_is_forbidden() {
        assert_eq!(
            authenticate(&keys(), Some("Bearer abc.def.ghi")),
            Err(AuthError::Forbidden(TokenError::Invalid))
        );
    }

    #[test]
    fn expired_token_is_forbidden() {
        let issued = time::OffsetDateTime::now_utc() - time::Duration::hours(3);
        let token = keys().issue_at(&bob(), issued).unwrap();
        assert_eq!(
            authenticate(&keys(), Some(format!("Bearer {token}").as_str())),
            Err(AuthError::Forbidden(TokenError::Expired))
        );
    }

    #[test]
    fn valid_token_resolves_identity() {
        let token = keys().issue(&bob()).unwrap();
        assert_eq!(
            authenticate(&keys(), Some(format!("Bearer {token}").as_str())),
            Ok(bob())
        );
        assert_eq!(
            authenticate(&keys(), Some(format!("bearer {token}").as_str())),
            Ok(bob())
        );
    }
}
