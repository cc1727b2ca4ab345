//! 통합 API 에러 응답 타입.
//!
//! 인증 관련 실패는 어떤 검사가 실패했는지 드러내지 않도록
//! `UNAUTHORIZED` / `FORBIDDEN` 두 코드로만 응답합니다.

use serde::{Deserialize, Serialize};

/// API 에러 응답.
///
/// ```json
/// {
///   "code": "UNAUTHORIZED",
///   "message": "인증이 필요합니다",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "UNAUTHORIZED", "FORBIDDEN", "INTERNAL_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "인증이 필요합니다")
    }

    pub fn forbidden() -> Self {
        Self::new("FORBIDDEN", "권한이 부족합니다")
    }

    pub fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "내부 서버 오류")
    }
}
