use serde_json::Value;
use tracing::info;

use crate::auth::claims::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Returned when the user never set a goal.
pub const DEFAULT_GOAL: f64 = 170.0;

pub async fn get_goal(state: &AppState, identity: &Identity) -> Result<f64, AppError> {
    let user = state
        .users
        .find_by_email(&identity.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(user.goal.unwrap_or(DEFAULT_GOAL))
}

/// Only JSON numbers are accepted; numeric strings are rejected.
pub async fn set_goal(
    state: &AppState,
    identity: &Identity,
    goal: &Value,
) -> Result<f64, AppError> {
    let goal = goal
        .as_f64()
        .ok_or_else(|| AppError::Validation("goal must be a number".into()))?;
    let user = state.users.update_goal(&identity.email, goal).await?;
    info!(email = %identity.email, goal, "goal updated");
    Ok(user.goal.unwrap_or(goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{services::signup, SignupRequest};
    use serde_json::json;

    async fn state_with_user(email: &str) -> (AppState, Identity) {
        let state = AppState::fake();
        signup(
            &state,
            SignupRequest {
                name: Some("User".into()),
                email: Some(email.into()),
                password: Some("p1".into()),
            },
        )
        .await
        .unwrap();
        (state, Identity { email: email.into() })
    }

    #[tokio::test]
    async fn unset_goal_reads_default() {
        let (state, me) = state_with_user("a@x.com").await;
        assert_eq!(get_goal(&state, &me).await.unwrap(), 170.0);
        assert_eq!(get_goal(&state, &me).await.unwrap(), 170.0);
    }

    #[tokio::test]
    async fn set_then_get() {
        let (state, me) = state_with_user("a@x.com").await;
        assert_eq!(set_goal(&state, &me, &json!(180)).await.unwrap(), 180.0);
        assert_eq!(get_goal(&state, &me).await.unwrap(), 180.0);
        assert_eq!(set_goal(&state, &me, &json!(172.5)).await.unwrap(), 172.5);
        assert_eq!(get_goal(&state, &me).await.unwrap(), 172.5);
    }

    #[tokio::test]
    async fn non_numeric_goal_is_rejected() {
        let (state, me) = state_with_user("a@x.com").await;
        for bad in [json!("180"), json!(null), json!(true), json!({"v": 1}), json!([180])] {
            let err = set_goal(&state, &me, &bad).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(get_goal(&state, &me).await.unwrap(), DEFAULT_GOAL);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let state = AppState::fake();
        let ghost = Identity {
            email: "ghost@x.com".into(),
        };
        assert!(matches!(
            get_goal(&state, &ghost).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            set_goal(&state, &ghost, &json!(150)).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn goals_are_per_user() {
        let (state, a) = state_with_user("a@x.com").await;
        signup(
            &state,
            SignupRequest {
                name: Some("B".into()),
                email: Some("b@x.com".into()),
                password: Some("p2".into()),
            },
        )
        .await
        .unwrap();
        let b = Identity {
            email: "b@x.com".into(),
        };

        set_goal(&state, &a, &json!(160)).await.unwrap();
        assert_eq!(get_goal(&state, &b).await.unwrap(), DEFAULT_GOAL);
    }
}
