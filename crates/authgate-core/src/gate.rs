//! 설정으로부터 인증/인가 구성 요소를 조립합니다.
//!
//! 각 서비스는 생성자로 의존성을 명시적으로 받으며, 전역 조회는 없습니다.

use std::sync::Arc;

use tracing::{info, warn};

use crate::authentication::AuthenticationService;
use crate::authorization::AuthorizationGuard;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::credential_store::{CredentialStore, InMemoryCredentialStore};
use crate::error::GateResult;
use crate::token::TokenCodec;

/// 조립된 인증 게이트.
#[derive(Clone)]
pub struct AuthGate {
    pub codec: Arc<TokenCodec>,
    pub authentication: Arc<AuthenticationService>,
    pub guard: Arc<AuthorizationGuard>,
}

impl AuthGate {
    /// 시스템 시계로 조립.
    pub fn from_config(config: &AppConfig) -> GateResult<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &AppConfig, clock: Arc<dyn Clock>) -> GateResult<Self> {
        config.validate()?;

        let store = if config.users.is_empty() {
            warn!("No users configured, loading demo accounts (admin/admin123, user/user123)");
            InMemoryCredentialStore::with_demo_users()?
        } else {
            InMemoryCredentialStore::new(config.identities())?
        };
        info!(users = store.len(), "Credential store loaded");

        let codec = Arc::new(TokenCodec::with_clock(
            &config.auth.secret,
            config.auth.issuer.clone(),
            config.auth.audience.clone(),
            clock,
        )?);

        Ok(Self::new(Arc::new(store), codec, config.auth.token_ttl()))
    }

    /// 이미 만들어진 저장소와 코덱으로 조립.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        ttl: chrono::Duration,
    ) -> Self {
        Self {
            authentication: Arc::new(AuthenticationService::new(store, codec.clone(), ttl)),
            guard: Arc::new(AuthorizationGuard::new(codec.clone())),
            codec,
        }
    }
}
