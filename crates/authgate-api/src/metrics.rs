//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 인증 결과 메트릭을 수집하고 `/metrics` 엔드포인트로 노출합니다.

use authgate_core::{GuardError, LoginError, LoginResponse};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설치하고 핸들을 반환합니다.
///
/// 레코더는 프로세스당 한 번만 설치할 수 있습니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭
// ============================================================================

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 인증 메트릭
// ============================================================================

/// 로그인 결과 라벨.
pub fn login_outcome(result: &Result<LoginResponse, LoginError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(LoginError::Unauthorized) => "unauthorized",
        Err(LoginError::Issuance(_)) => "error",
    }
}

/// 로그인 시도 카운터 증가.
pub fn record_login(outcome: &'static str) {
    counter!("authgate_logins_total", "outcome" => outcome).increment(1);
}

/// 가드 판정 라벨.
pub fn guard_outcome<T>(result: &Result<T, GuardError>) -> &'static str {
    match result {
        Ok(_) => "authorized",
        Err(GuardError::Unauthenticated) => "unauthenticated",
        Err(GuardError::Forbidden) => "forbidden",
    }
}

/// 가드 판정 카운터 증가.
pub fn record_guard_decision(outcome: &'static str) {
    counter!("authgate_guard_decisions_total", "outcome" => outcome).increment(1);
}
