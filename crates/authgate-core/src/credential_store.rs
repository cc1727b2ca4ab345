//! 사용자 자격증명 저장소.
//!
//! 저장소는 `verify` 하나의 기능만 노출합니다. 고정된 인메모리 목록이 기본
//! 구현이며, 디렉터리 서비스나 DB 기반 구현은 같은 트레이트로 교체할 수 있습니다.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use tracing::{debug, error};

use crate::identity::{Credential, Identity};
use crate::password::{hash_password, verify_password, PasswordError};
use crate::role::Role;

/// 자격증명 검증 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// 사용자 없음 또는 비밀번호 불일치 (구분하지 않음)
    #[error("잘못된 자격증명")]
    InvalidCredentials,
    /// 저장된 해시를 해석할 수 없음
    #[error("저장된 비밀번호 해시가 손상되었습니다: {username}")]
    CorruptHash { username: String },
}

/// 사용자 자격증명 저장소.
pub trait CredentialStore: Send + Sync {
    /// 사용자 이름과 비밀번호가 일치하는 신원을 반환합니다.
    fn verify(&self, credential: &Credential) -> Result<Identity, CredentialError>;
}

/// 시작 시 로드되는 고정 사용자 목록.
pub struct InMemoryCredentialStore {
    identities: HashMap<String, Identity>,
    /// 존재하지 않는 사용자에 대해서도 해시 검증을 수행하기 위한 더미 해시
    dummy_hash: String,
}

impl InMemoryCredentialStore {
    /// 신원 목록으로 저장소 생성.
    ///
    /// 사용자 이름이 중복되면 나중 항목은 무시됩니다 (설정 검증에서 먼저 걸러짐).
    pub fn new(identities: impl IntoIterator<Item = Identity>) -> Result<Self, PasswordError> {
        let mut by_username = HashMap::new();
        for identity in identities {
            by_username
                .entry(identity.username.clone())
                .or_insert(identity);
        }

        Ok(Self {
            identities: by_username,
            dummy_hash: hash_password("authgate-dummy-password")?,
        })
    }

    /// 데모 계정 (`admin/admin123`, `user/user123`).
    ///
    /// 비밀번호는 생성 시점에 해싱됩니다.
    pub fn with_demo_users() -> Result<Self, PasswordError> {
        Self::new([
            Identity::new(1, "admin", hash_password("admin123")?, Role::admin()),
            Identity::new(2, "user", hash_password("user123")?, Role::user()),
        ])
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn verify(&self, credential: &Credential) -> Result<Identity, CredentialError> {
        let password = credential.password.expose_secret();

        let Some(identity) = self.identities.get(&credential.username) else {
            // 응답 시간으로 사용자 존재 여부가 드러나지 않도록 동일한 비용을 지불
            let _ = verify_password(password, &self.dummy_hash);
            debug!("Credential check failed");
            return Err(CredentialError::InvalidCredentials);
        };

        match verify_password(password, &identity.password_hash) {
            Ok(()) => Ok(identity.clone()),
            Err(PasswordError::InvalidHashFormat) => {
                error!(username = %identity.username, "Stored password hash is not a valid PHC string");
                Err(CredentialError::CorruptHash {
                    username: identity.username.clone(),
                })
            }
            Err(_) => {
                debug!("Credential check failed");
                Err(CredentialError::InvalidCredentials)
            }
        }
    }
}
