//! # Authgate Core
//!
//! 상태 없는 bearer 토큰 인증과 역할 기반 인가의 핵심 로직을 제공합니다.
//!
//! - 자격증명 저장소 ([`CredentialStore`])
//! - 서명된 토큰 발급/검증 ([`TokenCodec`])
//! - 로그인 서비스 ([`AuthenticationService`])
//! - 보호 리소스 가드 ([`AuthorizationGuard`])
//! - 설정 관리 및 로깅 인프라
//!
//! 흐름: `login` → `issue` → (클라이언트 보관) → `check` → `validate` → 핸들러.
//! 서버는 발급한 토큰을 기억하지 않습니다.

pub mod authentication;
pub mod authorization;
pub mod clock;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod gate;
pub mod identity;
pub mod logging;
pub mod password;
pub mod role;
pub mod token;

pub use authentication::{AuthenticationService, LoginError, LoginResponse};
pub use authorization::{parse_bearer, AuthenticatedUser, AuthorizationGuard, GuardError};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, AuthConfig, LoggingConfig, ServerConfig, UserConfig};
pub use credential_store::{CredentialError, CredentialStore, InMemoryCredentialStore};
pub use error::{GateError, GateResult};
pub use gate::AuthGate;
pub use identity::{Credential, Identity};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use password::{hash_password, verify_password, PasswordError};
pub use role::Role;
pub use token::{ClaimSet, Claims, IssuedToken, TokenCodec, TokenError};
