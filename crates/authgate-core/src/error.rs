//! 인증 게이트웨이의 공통 에러 타입.
//!
//! 구성 요소별 세부 에러(`CredentialError`, `TokenError` 등)는 각 모듈에
//! 정의되어 있고, 이 모듈은 설정 로드 및 서비스 조립 단계의 에러를 다룹니다.

use thiserror::Error;

/// 설정 및 초기화 에러.
#[derive(Debug, Error)]
pub enum GateError {
    /// 설정 값이 유효하지 않음
    #[error("설정 에러: {0}")]
    Config(String),

    /// 설정 소스(파일, 환경 변수) 로드 실패
    #[error("설정 로드 실패: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// 비밀번호 해싱 실패
    #[error("비밀번호 해싱 에러: {0}")]
    Password(#[from] crate::password::PasswordError),

    /// 토큰 코덱 생성 실패
    #[error("토큰 코덱 에러: {0}")]
    Token(#[from] crate::token::TokenError),
}

/// 초기화 작업을 위한 Result 타입.
pub type GateResult<T> = Result<T, GateError>;

impl GateError {
    /// 잘못된 설정 값 에러 생성.
    pub fn config(message: impl Into<String>) -> Self {
        GateError::Config(message.into())
    }
}
