//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 상태는 시작 후 읽기 전용이며 `Arc`로 요청 간에 공유됩니다.
//! 세션이나 발급 토큰 목록은 보관하지 않습니다.

use authgate_core::AuthGate;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 로그인 서비스, 인가 가드, 토큰 코덱
    pub gate: AuthGate,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    pub fn new(gate: AuthGate) -> Self {
        Self {
            gate,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 데모 계정과 고정 비밀 키를 사용하는 테스트 상태.
#[cfg(test)]
pub(crate) fn create_test_state() -> AppState {
    use std::sync::Arc;

    use authgate_core::{InMemoryCredentialStore, TokenCodec};
    use secrecy::SecretString;

    let codec = TokenCodec::new(
        &SecretString::from("test-secret-key-for-jwt-testing-minimum-32-chars".to_string()),
        "authgate",
        "authgate-clients",
    )
    .unwrap();
    let store = InMemoryCredentialStore::with_demo_users().unwrap();

    AppState::new(AuthGate::new(
        Arc::new(store),
        Arc::new(codec),
        chrono::Duration::seconds(60),
    ))
}
