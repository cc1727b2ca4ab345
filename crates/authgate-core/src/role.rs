//! 역할 기반 접근 제어 (RBAC).
//!
//! 역할은 토큰의 `role` 클레임에 그대로 실리는 문자열입니다.
//! 계층이나 상속은 없으며, 보호된 리소스는 정확히 일치하는 역할만 허용합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 비교는 대소문자를 구분합니다 (`"admin"` ≠ `"Admin"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// 관리자 역할 이름.
    pub const ADMIN: &'static str = "admin";
    /// 일반 사용자 역할 이름.
    pub const USER: &'static str = "user";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 관리자 역할.
    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    /// 일반 사용자 역할.
    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 요구 역할을 만족하는지 확인 (정확히 일치).
    pub fn satisfies(&self, required: &Role) -> bool {
        self.0 == required.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self(name)
    }
}
