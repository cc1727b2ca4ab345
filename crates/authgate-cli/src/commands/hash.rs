//! 비밀번호 해시 생성.
//!
//! 설정 파일의 `[[users]]` 항목에 넣을 PHC 문자열을 만듭니다.

use anyhow::Context;
use authgate_core::password::{hash_password, validate_password_strength};

/// 해시 생성 결과.
#[derive(Debug)]
pub struct HashOutcome {
    /// Argon2id PHC 문자열
    pub hash: String,
    /// 비밀번호가 약한 경우 그 이유 (해시는 그래도 생성됨)
    pub weakness: Option<&'static str>,
}

pub fn hash_password_command(password: &str) -> anyhow::Result<HashOutcome> {
    let hash = hash_password(password).context("Failed to hash password")?;

    Ok(HashOutcome {
        hash,
        weakness: validate_password_strength(password).err(),
    })
}
