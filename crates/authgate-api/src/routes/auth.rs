//! 로그인 endpoint.
//!
//! 자격증명을 확인하고 서명된 토큰을 발급합니다. 서버는 발급한 토큰을 저장하지 않습니다.

use std::sync::Arc;

use authgate_core::{Credential, LoginError, LoginResponse};
use axum::{
    extract::State,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{error, info};

use crate::error::ApiErrorResponse;
use crate::metrics::{login_outcome, record_login};
use crate::state::AppState;

/// 로그인 실패 응답.
///
/// 사용자 없음과 비밀번호 불일치는 같은 응답을 받습니다.
#[derive(Debug)]
pub enum LoginFailure {
    Unauthorized,
    Internal,
}

impl IntoResponse for LoginFailure {
    fn into_response(self) -> Response {
        match self {
            LoginFailure::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                Json(ApiErrorResponse::unauthorized()),
            )
                .into_response(),
            LoginFailure::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiErrorResponse::internal()),
            )
                .into_response(),
        }
    }
}

/// 로그인.
///
/// 비밀번호 해시 검증은 CPU를 오래 점유하므로 blocking 스레드에서 실행합니다.
/// POST /login, POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credential): Json<Credential>,
) -> Result<Json<LoginResponse>, LoginFailure> {
    let authentication = state.gate.authentication.clone();

    let result = tokio::task::spawn_blocking(move || authentication.login(&credential))
        .await
        .map_err(|e| {
            error!(error = %e, "Login task failed");
            LoginFailure::Internal
        })?;
    record_login(login_outcome(&result));

    match result {
        Ok(response) => {
            info!(expires_at = %response.expires_at, "Token issued");
            Ok(Json(response))
        }
        Err(LoginError::Unauthorized) => Err(LoginFailure::Unauthorized),
        Err(LoginError::Issuance(e)) => {
            error!(error = %e, "Token issuance failed");
            Err(LoginFailure::Internal)
        }
    }
}

/// 로그인 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/api/auth/login", post(login))
}
