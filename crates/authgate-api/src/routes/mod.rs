//! REST API 라우트.
//!
//! | 경로 | 인증 |
//! |------|------|
//! | `POST /login`, `POST /api/auth/login` | 없음 |
//! | `GET /api/protected` | `admin` 역할 |
//! | `GET /api/me` | 유효한 토큰 |
//! | `GET /health`, `GET /health/ready` | 없음 |

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod protected;

pub use auth::{auth_router, login, LoginFailure};
pub use health::{health_router, HealthResponse};
pub use protected::{protected_router, ProtectedResponse};

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health_router())
        .merge(auth_router())
        .merge(protected_router())
}
