//! 보호된 리소스 접근 제어.
//!
//! 요청마다 제시된 bearer 토큰만으로 인증/인가 상태를 새로 도출합니다.
//! 세션을 이어가지 않으며, 실패 사유는 `Unauthenticated`/`Forbidden` 두 가지로만 드러납니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::role::Role;
use crate::token::{Claims, TokenCodec};

/// 인가 거부 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// 토큰 없음, 형식 오류, 검증 실패 (HTTP 401)
    #[error("인증이 필요합니다")]
    Unauthenticated,
    /// 유효한 토큰이지만 역할 불일치 또는 역할 없음 (HTTP 403)
    #[error("권한이 부족합니다")]
    Forbidden,
}

/// 검증된 호출자.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub subject: String,
    /// 토큰에 역할 클레임이 없으면 `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub claims: Claims,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub.clone(),
            role: claims.role.clone(),
            expires_at: claims.expires_at(),
            claims,
        }
    }
}

/// `Authorization` 헤더 값에서 bearer 토큰을 꺼냅니다.
///
/// 스킴 이름은 대소문자를 구분하지 않습니다 (RFC 6750).
pub fn parse_bearer(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

/// 역할 기반 인가 가드.
pub struct AuthorizationGuard {
    codec: Arc<TokenCodec>,
}

impl AuthorizationGuard {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// 토큰 검증만 수행 (역할 무관).
    pub fn authenticate(
        &self,
        authorization_header: Option<&str>,
    ) -> Result<AuthenticatedUser, GuardError> {
        let Some(token) = authorization_header.and_then(parse_bearer) else {
            debug!("Missing or malformed bearer credentials");
            return Err(GuardError::Unauthenticated);
        };

        let claims = self.codec.validate(token).map_err(|e| {
            debug!(reason = e.kind(), "Token rejected");
            GuardError::Unauthenticated
        })?;

        Ok(AuthenticatedUser::from(claims))
    }

    /// 토큰 검증 후 요구 역할과 정확히 일치하는지 확인.
    ///
    /// 역할 클레임이 없는 토큰은 서명이 유효해도 `Forbidden`입니다.
    pub fn check(
        &self,
        authorization_header: Option<&str>,
        required_role: &Role,
    ) -> Result<AuthenticatedUser, GuardError> {
        let user = self.authenticate(authorization_header)?;

        match &user.role {
            Some(role) if role.satisfies(required_role) => Ok(user),
            Some(role) => {
                debug!(
                    subject = %user.subject,
                    role = %role,
                    required = %required_role,
                    "Role requirement not met"
                );
                Err(GuardError::Forbidden)
            }
            None => {
                debug!(
                    subject = %user.subject,
                    required = %required_role,
                    "Token carries no role"
                );
                Err(GuardError::Forbidden)
            }
        }
    }
}
