//! 보호 리소스 endpoint.

use std::sync::Arc;

use authgate_core::{AuthenticatedUser, Role};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{AdminAuth, BearerAuth};
use crate::state::AppState;

/// 관리자 전용 리소스 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub subject: String,
    pub role: String,
    pub message: String,
}

/// 관리자 전용 데이터.
///
/// GET /api/protected
pub async fn protected_data(auth: AdminAuth) -> Json<ProtectedResponse> {
    let user = auth.into_inner();
    // 가드를 통과했으므로 역할은 항상 존재
    let role = user.role.as_ref().map(Role::to_string).unwrap_or_default();

    Json(ProtectedResponse {
        message: format!(
            "Hello, {}! This is protected data for users with '{}' role.",
            user.subject, role
        ),
        role,
        subject: user.subject,
    })
}

/// 현재 토큰의 주체 정보. 역할 무관.
///
/// GET /api/me
pub async fn me(BearerAuth(user): BearerAuth) -> Json<AuthenticatedUser> {
    Json(user)
}

pub fn protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/protected", get(protected_data))
        .route("/api/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_core::Credential;
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::state::create_test_state;

    fn token_for(state: &AppState, username: &str, password: &str) -> String {
        state
            .gate
            .authentication
            .login(&Credential::new(username, password))
            .unwrap()
            .token
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_admin_gets_protected_data() {
        let state = Arc::new(create_test_state());
        let token = token_for(&state, "admin", "admin123");
        let app = protected_router().with_state(state);

        let response = app
            .oneshot(get_with_token("/api/protected", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let data: ProtectedResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(data.subject, "admin");
        assert_eq!(data.role, Role::ADMIN);
        assert!(data.message.contains("admin"));
    }

    #[tokio::test]
    async fn test_user_is_forbidden_from_protected_data() {
        let state = Arc::new(create_test_state());
        let token = token_for(&state, "user", "user123");
        let app = protected_router().with_state(state);

        let response = app
            .oneshot(get_with_token("/api/protected", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_me_accepts_any_role() {
        let state = Arc::new(create_test_state());
        let token = token_for(&state, "user", "user123");
        let app = protected_router().with_state(state);

        let response = app.oneshot(get_with_token("/api/me", &token)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["subject"], "user");
        assert_eq!(json["role"], "user");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let app = protected_router().with_state(Arc::new(create_test_state()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
