//! 상태 없는 bearer 토큰 인증 HTTP 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 로그인 엔드포인트 (토큰 발급)
//! - 역할 기반 보호 리소스
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: bearer 토큰 추출기와 역할 검사
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{AdminAuth, AuthRejection, BearerAuth, RoleAuth};
pub use error::ApiErrorResponse;
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;
