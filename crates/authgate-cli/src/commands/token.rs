//! 오프라인 토큰 발급/검증.
//!
//! 서버와 같은 비밀 키를 설정에서 읽으므로 운영자 전용입니다.
//! 검증 실패 시 실패 종류를 그대로 보여줍니다.

use anyhow::Context;
use authgate_core::{AppConfig, ClaimSet, Claims, IssuedToken, Role, TokenCodec, TokenError};
use chrono::Duration;

/// `key=value` 형식의 추가 클레임 파싱 (clap value parser).
pub fn parse_claim(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid claim '{}': expected key=value", s))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid claim '{}': empty key", s));
    }

    Ok((key.to_string(), value.to_string()))
}

/// 설정의 비밀 키/발급자/대상으로 코덱 생성.
pub fn codec_from_config(config: &AppConfig) -> anyhow::Result<TokenCodec> {
    TokenCodec::new(
        &config.auth.secret,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
    )
    .context("Failed to build token codec from configuration")
}

/// 토큰 발급.
///
/// `ttl_secs`가 없으면 설정의 기본 유효 기간을 사용합니다.
pub fn issue_token(
    codec: &TokenCodec,
    subject: &str,
    role: &str,
    claims: Vec<(String, String)>,
    ttl: Duration,
) -> anyhow::Result<IssuedToken> {
    let extra: ClaimSet = claims.into_iter().collect();

    codec
        .issue(subject, &Role::new(role), extra, ttl)
        .with_context(|| format!("Failed to issue token for '{}'", subject))
}

/// 토큰 검증.
pub fn verify_token(codec: &TokenCodec, token: &str) -> Result<Claims, TokenError> {
    codec.validate(token.trim())
}

/// 클레임을 `key: value` 줄 목록으로 출력용 포맷.
pub fn format_claims(claims: &Claims) -> String {
    let mut lines: Vec<String> = claims
        .to_claim_set()
        .into_iter()
        .map(|(key, value)| format!("{:>8}: {}", key, value))
        .collect();
    lines.push(format!("{:>8}: {}", "issued", claims.issued_at().to_rfc3339()));
    lines.push(format!("{:>8}: {}", "expires", claims.expires_at().to_rfc3339()));
    lines.join("\n")
}
