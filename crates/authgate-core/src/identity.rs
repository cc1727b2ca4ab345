//! 사용자 신원과 로그인 자격증명.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// 등록된 사용자.
///
/// 시작 시 한 번 로드되고 이후 변경되지 않습니다.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: u32,
    pub username: String,
    /// PHC 형식 Argon2id 해시
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

impl Identity {
    pub fn new(
        id: u32,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            role,
        }
    }
}

// 해시도 오프라인 공격 대상이므로 로그에 남기지 않음
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// 로그인 요청 자격증명.
///
/// 원본 클라이언트가 보내는 `Username`/`Password` 키도 허용합니다.
#[derive(Debug, Deserialize)]
pub struct Credential {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: SecretString,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
