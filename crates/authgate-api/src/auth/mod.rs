//! 요청 인증 및 역할 검사.

pub mod extractor;

pub use extractor::{AdminAuth, AdminRole, AuthRejection, BearerAuth, RequiredRole, RoleAuth};
