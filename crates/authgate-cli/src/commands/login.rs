//! 클라이언트 로그인 흐름.
//!
//! 1. `POST {url}/login` 으로 토큰 발급
//! 2. `GET {url}{path}` 에 `Authorization: Bearer <token>` 헤더로 접근
//!
//! 토큰은 메모리에만 보관하고 저장하지 않습니다.

use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// 로그인 흐름 설정.
#[derive(Debug, Clone)]
pub struct LoginFlowConfig {
    /// 서버 주소 (예: http://127.0.0.1:3000)
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// 로그인 후 접근할 보호 경로
    pub path: String,
}

impl LoginFlowConfig {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBody {
    token: String,
    expires_at: String,
}

/// 로그인 흐름 결과.
#[derive(Debug)]
pub struct LoginFlowOutcome {
    pub token: String,
    pub expires_at: String,
    /// 보호 경로 응답 상태 코드
    pub status: u16,
    /// 보호 경로 응답 본문
    pub body: String,
}

/// 로그인 후 보호 경로에 접근합니다.
///
/// 로그인 자체가 실패하면 에러를 반환하고, 보호 경로의 401/403은 결과로 돌려줍니다.
pub async fn run_login_flow(
    client: &reqwest::Client,
    config: &LoginFlowConfig,
) -> anyhow::Result<LoginFlowOutcome> {
    let login_url = config.url("/login");
    debug!(url = %login_url, username = %config.username, "Requesting token");

    let response = client
        .post(&login_url)
        .json(&json!({
            "username": config.username,
            "password": config.password,
        }))
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", login_url))?;

    if !response.status().is_success() {
        bail!("Login failed: HTTP {}", response.status());
    }

    let TokenBody { token, expires_at } = response
        .json()
        .await
        .context("Login response was not a token")?;

    let resource_url = config.url(&config.path);
    debug!(url = %resource_url, "Requesting protected resource");

    let response = client
        .get(&resource_url)
        .bearer_auth(&token)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", resource_url))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .context("Failed to read protected resource response")?;

    Ok(LoginFlowOutcome {
        token,
        expires_at,
        status,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use authgate_api::{create_api_router, AppState};
    use authgate_core::{AuthGate, InMemoryCredentialStore, TokenCodec};
    use secrecy::SecretString;

    /// 임의 포트에 테스트 서버를 띄우고 주소를 반환합니다.
    async fn spawn_server() -> String {
        let codec = TokenCodec::new(
            &SecretString::from("test-secret-key-for-jwt-testing-minimum-32-chars".to_string()),
            "authgate",
            "authgate-clients",
        )
        .unwrap();
        let store = InMemoryCredentialStore::with_demo_users().unwrap();
        let gate = AuthGate::new(
            Arc::new(store),
            Arc::new(codec),
            chrono::Duration::seconds(60),
        );
        let app = create_api_router().with_state(Arc::new(AppState::new(gate)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn flow(base_url: &str, username: &str, password: &str) -> LoginFlowConfig {
        LoginFlowConfig {
            base_url: format!("{}/", base_url),
            username: username.to_string(),
            password: password.to_string(),
            path: "/api/protected".to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_flow_reaches_protected_resource() {
        let base_url = spawn_server().await;
        let client = reqwest::Client::new();

        let outcome = run_login_flow(&client, &flow(&base_url, "admin", "admin123"))
            .await
            .unwrap();

        assert_eq!(outcome.status, 200);
        assert!(outcome.body.contains("admin"));
        assert_eq!(outcome.token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_user_flow_is_forbidden() {
        let base_url = spawn_server().await;
        let client = reqwest::Client::new();

        let outcome = run_login_flow(&client, &flow(&base_url, "user", "user123"))
            .await
            .unwrap();

        assert_eq!(outcome.status, 403);
    }

    #[tokio::test]
    async fn test_bad_credentials_fail_login() {
        let base_url = spawn_server().await;
        let client = reqwest::Client::new();

        let err = run_login_flow(&client, &flow(&base_url, "admin", "wrong"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("401"));
    }
}
