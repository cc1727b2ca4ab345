//! Axum용 bearer 토큰 인증 추출기.
//!
//! 핸들러가 추출기를 인자로 받으면 가드 검사를 통과한 요청만 핸들러 본문에 도달합니다.

use std::marker::PhantomData;
use std::sync::Arc;

use authgate_core::{AuthenticatedUser, GuardError, Role};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ApiErrorResponse;
use crate::metrics::{guard_outcome, record_guard_decision};
use crate::state::AppState;

/// 인증 거부.
///
/// 실패 원인(만료, 서명 불일치, 발급자 불일치 등)은 응답에 포함되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("인증이 필요합니다")]
    Unauthenticated,
    #[error("권한이 부족합니다")]
    Forbidden,
}

impl From<GuardError> for AuthRejection {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthenticated => Self::Unauthenticated,
            GuardError::Forbidden => Self::Forbidden,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"))],
                Json(ApiErrorResponse::unauthorized()),
            )
                .into_response(),
            AuthRejection::Forbidden => {
                (StatusCode::FORBIDDEN, Json(ApiErrorResponse::forbidden())).into_response()
            }
        }
    }
}

/// Authorization 헤더 값. UTF-8이 아닌 값은 없는 것으로 취급합니다.
fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// 역할과 무관하게 유효한 토큰만 요구하는 추출기.
///
/// ```rust,ignore
/// async fn me(BearerAuth(user): BearerAuth) -> Json<AuthenticatedUser> {
///     Json(user)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for BearerAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);

        let result = state.gate.guard.authenticate(authorization_header(parts));
        record_guard_decision(guard_outcome(&result));

        Ok(Self(result?))
    }
}

/// 추출기가 요구하는 역할.
pub trait RequiredRole: Send + Sync + 'static {
    const ROLE: &'static str;
}

/// `admin` 역할.
#[derive(Debug, Clone, Copy)]
pub struct AdminRole;

impl RequiredRole for AdminRole {
    const ROLE: &'static str = Role::ADMIN;
}

/// 특정 역할을 요구하는 추출기.
///
/// 역할 비교는 정확히 일치해야 하며 계층은 없습니다.
/// 역할 클레임이 없는 토큰은 403으로 거부됩니다.
#[derive(Debug, Clone)]
pub struct RoleAuth<R: RequiredRole> {
    pub user: AuthenticatedUser,
    _role: PhantomData<fn() -> R>,
}

impl<R: RequiredRole> RoleAuth<R> {
    pub fn into_inner(self) -> AuthenticatedUser {
        self.user
    }
}

impl<S, R> FromRequestParts<S> for RoleAuth<R>
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
    R: RequiredRole,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = Arc::<AppState>::from_ref(state);
        let required = Role::new(R::ROLE);

        let result = state
            .gate
            .guard
            .check(authorization_header(parts), &required);
        record_guard_decision(guard_outcome(&result));

        Ok(Self {
            user: result?,
            _role: PhantomData,
        })
    }
}

/// 관리자 전용 추출기.
pub type AdminAuth = RoleAuth<AdminRole>;
