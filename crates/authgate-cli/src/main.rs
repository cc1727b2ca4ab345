//! Authgate CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일용 비밀번호 해시 생성
//! authgate hash-password 's3cret-passw0rd'
//!
//! # 관리자 토큰 발급 (비밀 키는 설정/환경변수에서 읽음)
//! AUTHGATE__AUTH__SECRET=... authgate issue --subject alice --role admin --claim tenant=acme
//!
//! # 토큰 검증
//! authgate verify eyJhbGciOi...
//!
//! # 실행 중인 서버에 로그인 후 보호 리소스 접근
//! authgate login --url http://127.0.0.1:3000 --username admin --password admin123
//! ```

use anyhow::{anyhow, bail};
use authgate_cli::commands::hash::hash_password_command;
use authgate_cli::commands::login::{run_login_flow, LoginFlowConfig};
use authgate_cli::commands::token::{
    codec_from_config, format_claims, issue_token, parse_claim, verify_token,
};
use authgate_core::{init_logging, AppConfig, LogConfig};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "authgate")]
#[command(about = "Authgate CLI - bearer 토큰 발급/검증 및 로그인 도구", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (issue/verify에서 비밀 키를 읽음)
    #[arg(
        short,
        long,
        global = true,
        env = "AUTHGATE_CONFIG",
        default_value = "config/default.toml"
    )]
    config: String,

    /// 로그 레벨
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 설정 파일용 Argon2id 비밀번호 해시 생성
    HashPassword {
        /// 해시할 비밀번호
        password: String,
    },

    /// 설정된 비밀 키로 토큰 발급
    Issue {
        /// 토큰 주체 (사용자 이름)
        #[arg(short, long)]
        subject: String,

        /// 역할 (예: admin, user)
        #[arg(short, long)]
        role: String,

        /// 추가 클레임 (key=value, 반복 가능)
        #[arg(long = "claim", value_parser = parse_claim)]
        claims: Vec<(String, String)>,

        /// 유효 기간(초). 생략 시 설정값 사용
        #[arg(long)]
        ttl_secs: Option<i64>,
    },

    /// 토큰 검증 후 클레임 출력
    Verify {
        /// 검증할 토큰
        token: String,
    },

    /// 서버에 로그인하고 보호 경로에 접근
    Login {
        /// 서버 주소
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        url: String,

        #[arg(long)]
        username: String,

        #[arg(long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
        password: String,

        /// 로그인 후 접근할 경로
        #[arg(long, default_value = "/api/protected")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = init_logging(LogConfig::new(&cli.log_level)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::HashPassword { password } => {
            let outcome = hash_password_command(&password)?;
            if let Some(reason) = outcome.weakness {
                eprintln!("warning: {}", reason);
            }
            println!("{}", outcome.hash);
        }

        Commands::Issue {
            subject,
            role,
            claims,
            ttl_secs,
        } => {
            let config = AppConfig::load(&cli.config)?;
            let codec = codec_from_config(&config)?;
            let ttl = match ttl_secs {
                Some(secs) => chrono::Duration::try_seconds(secs)
                    .ok_or_else(|| anyhow!("ttl out of range: {}", secs))?,
                None => config.auth.token_ttl(),
            };

            let issued = issue_token(&codec, &subject, &role, claims, ttl)?;
            info!(subject = %subject, role = %role, "Token issued");

            println!("{}", issued.token);
            eprintln!("expires at {}", issued.expires_at().to_rfc3339());
        }

        Commands::Verify { token } => {
            let config = AppConfig::load(&cli.config)?;
            let codec = codec_from_config(&config)?;

            match verify_token(&codec, &token) {
                Ok(claims) => {
                    println!("valid");
                    println!("{}", format_claims(&claims));
                }
                Err(e) => bail!("invalid: {} ({})", e.kind(), e),
            }
        }

        Commands::Login {
            url,
            username,
            password,
            path,
        } => {
            let client = reqwest::Client::new();
            let flow = LoginFlowConfig {
                base_url: url,
                username,
                password,
                path,
            };

            let outcome = run_login_flow(&client, &flow).await?;
            println!("token expires at {}", outcome.expires_at);
            println!("GET {} -> {}", flow.path, outcome.status);
            println!("{}", outcome.body);
        }
    }

    Ok(())
}
