//! 설정 관리.
//!
//! 설정은 시작 시 한 번 로드되며 실행 중에는 바뀌지 않습니다.
//! 우선순위: 기본값 < 설정 파일 < `AUTHGATE__` 환경 변수.

use std::collections::HashSet;
use std::path::Path;

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{GateError, GateResult};
use crate::identity::Identity;
use crate::password::is_phc_hash;
use crate::role::Role;
use crate::token::MIN_SECRET_LEN;

/// 기본 발급자.
pub const DEFAULT_ISSUER: &str = "authgate";
/// 기본 대상.
pub const DEFAULT_AUDIENCE: &str = "authgate-clients";
/// 기본 토큰 유효 기간 (초). 만료 동작을 보여주기 위한 짧은 값입니다.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60;

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 토큰 서명/검증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 등록 사용자 (비어 있으면 데모 계정 사용)
    pub users: Vec<UserConfig>,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 허용 CORS origin 목록 (비어 있으면 모두 허용)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 문자열.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 토큰 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC 서명 비밀 키 (최소 32바이트)
    pub secret: SecretString,
    /// 발급자 (`iss`)
    pub issuer: String,
    /// 대상 (`aud`)
    pub audience: String,
    /// 토큰 유효 기간 (초)
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::from(String::new()),
            issuer: DEFAULT_ISSUER.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        let secs = i64::try_from(self.token_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        Duration::seconds(secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 설정 파일의 사용자 항목.
///
/// 비밀번호는 `authgate hash-password`로 만든 PHC 해시로만 받습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    pub id: u32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl From<&UserConfig> for Identity {
    fn from(user: &UserConfig) -> Self {
        Identity::new(
            user.id,
            user.username.clone(),
            user.password_hash.clone(),
            Role::new(user.role.clone()),
        )
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드하고 검증합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> GateResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("AUTHGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> GateResult<Self> {
        Self::load("config/default.toml")
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> GateResult<()> {
        let secret_len = self.auth.secret.expose_secret().len();
        if secret_len == 0 {
            return Err(GateError::config(
                "auth.secret is not set (AUTHGATE__AUTH__SECRET)",
            ));
        }
        if secret_len < MIN_SECRET_LEN {
            return Err(GateError::config(format!(
                "auth.secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN, secret_len
            )));
        }
        if self.auth.issuer.is_empty() || self.auth.audience.is_empty() {
            return Err(GateError::config("auth.issuer and auth.audience must not be empty"));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(GateError::config("auth.token_ttl_secs must be positive"));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.username.as_str()) {
                return Err(GateError::config(format!(
                    "duplicate username in users: {}",
                    user.username
                )));
            }
            if user.role.is_empty() {
                return Err(GateError::config(format!(
                    "user {} has an empty role",
                    user.username
                )));
            }
            if !is_phc_hash(&user.password_hash) {
                return Err(GateError::config(format!(
                    "user {} password_hash is not a PHC string",
                    user.username
                )));
            }
        }

        Ok(())
    }

    /// 설정에 등록된 사용자를 신원 목록으로 변환.
    pub fn identities(&self) -> Vec<Identity> {
        self.users.iter().map(Identity::from).collect()
    }
}
