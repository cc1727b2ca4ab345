//! Authgate 운영자 CLI 도구 모음.
//!
//! - 비밀번호 해시 생성
//! - 오프라인 토큰 발급/검증
//! - 서버 대상 로그인 흐름 실행

pub mod commands;
