//! 로그인 처리.
//!
//! 자격증명을 검증하고, 성공하면 역할이 담긴 토큰을 발급합니다.
//! 실패 사유(사용자 없음, 비밀번호 불일치, 손상된 해시)는 모두 `Unauthorized`로 합쳐집니다.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::credential_store::{CredentialError, CredentialStore};
use crate::identity::Credential;
use crate::token::{ClaimSet, TokenCodec, TokenError};

/// 로그인 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("인증에 실패했습니다")]
    Unauthorized,
    #[error("토큰 발급 실패: {0}")]
    Issuance(#[from] TokenError),
}

/// 로그인 성공 응답.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// 항상 "Bearer"
    pub token_type: String,
}

/// 로그인 서비스.
pub struct AuthenticationService {
    store: Arc<dyn CredentialStore>,
    codec: Arc<TokenCodec>,
    ttl: Duration,
}

impl AuthenticationService {
    pub fn new(store: Arc<dyn CredentialStore>, codec: Arc<TokenCodec>, ttl: Duration) -> Self {
        Self { store, codec, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 자격증명 검증 후 토큰 발급.
    pub fn login(&self, credential: &Credential) -> Result<LoginResponse, LoginError> {
        let identity = self.store.verify(credential).map_err(|e| {
            if let CredentialError::CorruptHash { .. } = e {
                error!(error = %e, "Credential store failure during login");
            }
            info!("Login rejected");
            LoginError::Unauthorized
        })?;

        let issued = self
            .codec
            .issue(&identity.username, &identity.role, ClaimSet::new(), self.ttl)?;

        info!(
            username = %identity.username,
            role = %identity.role,
            expires_at = %issued.expires_at(),
            "Login succeeded"
        );

        Ok(LoginResponse {
            expires_at: issued.expires_at(),
            token: issued.token,
            token_type: "Bearer".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::credential_store::InMemoryCredentialStore;
    use crate::role::Role;
    use secrecy::SecretString;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const NOW: i64 = 1_700_000_000;

    fn service() -> (AuthenticationService, Arc<TokenCodec>) {
        let codec = Arc::new(
            TokenCodec::with_clock(
                &SecretString::from(TEST_SECRET.to_string()),
                "authgate",
                "authgate-clients",
                Arc::new(ManualClock::at(NOW)),
            )
            .unwrap(),
        );
        let store = Arc::new(InMemoryCredentialStore::with_demo_users().unwrap());
        (
            AuthenticationService::new(store, codec.clone(), Duration::seconds(60)),
            codec,
        )
    }

    #[test]
    fn test_login_issues_token_with_identity_role() {
        let (service, codec) = service();

        for (username, password, role) in [
            ("admin", "admin123", Role::admin()),
            ("user", "user123", Role::user()),
        ] {
            let response = service
                .login(&Credential::new(username, password))
                .unwrap();
            assert_eq!(response.token_type, "Bearer");
            assert_eq!(response.expires_at.timestamp(), NOW + 60);

            let claims = codec.validate(&response.token).unwrap();
            assert_eq!(claims.sub, username);
            assert_eq!(claims.role, Some(role));
        }
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (service, _) = service();

        let unknown = service.login(&Credential::new("ghost", "admin123"));
        let wrong_password = service.login(&Credential::new("admin", "wrong"));

        assert_eq!(unknown.unwrap_err(), LoginError::Unauthorized);
        assert_eq!(wrong_password.unwrap_err(), LoginError::Unauthorized);
    }

    #[test]
    fn test_login_response_serialization() {
        let (service, _) = service();
        let response = service
            .login(&Credential::new("admin", "admin123"))
            .unwrap();

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["token"].is_string());
        assert!(json["expiresAt"].is_string());
        assert_eq!(json["tokenType"], "Bearer");
    }
}
