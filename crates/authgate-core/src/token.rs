//! 서명된 bearer 토큰 처리.
//!
//! 토큰은 HS256 JWS compact 형식(`header.claims.signature`)입니다.
//! 서버는 발급한 토큰을 기록하지 않으며, 유효성은 오직 서명과 클레임으로 판단합니다.
//!
//! # 검증 순서
//!
//! 1. 구조 및 서명 (알고리즘은 검증기가 고정, 토큰 헤더를 신뢰하지 않음)
//! 2. 만료 (`now >= exp` 이면 만료, 허용 오차 없음)
//! 3. 발급자 (`iss`)
//! 4. 대상 (`aud`)

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::role::Role;

/// 서명 알고리즘. 토큰 헤더의 `alg` 값과 무관하게 항상 이 알고리즘으로 검증합니다.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// 서명 비밀 키 최소 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// 추가 클레임으로 덮어쓸 수 없는 이름.
pub const RESERVED_CLAIMS: [&str; 6] = ["sub", "role", "iss", "aud", "iat", "exp"];

/// 추가 클레임 (이름 순으로 정렬된 문자열 맵).
pub type ClaimSet = BTreeMap<String, String>;

/// 토큰 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이름
    pub sub: String,
    /// 사용자 역할. 역할 없이 발급된 토큰도 검증은 통과하며 역할 검사에서 거부됩니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// 발급 시 전달된 추가 클레임
    #[serde(flatten)]
    pub extra: ClaimSet,
}

impl Claims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.iat)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp_to_datetime(self.exp)
    }

    /// 모든 클레임을 문자열 맵으로 펼칩니다.
    pub fn to_claim_set(&self) -> ClaimSet {
        let mut set = self.extra.clone();
        set.insert("sub".to_string(), self.sub.clone());
        if let Some(role) = &self.role {
            set.insert("role".to_string(), role.to_string());
        }
        set.insert("iss".to_string(), self.iss.clone());
        set.insert("aud".to_string(), self.aud.clone());
        set.insert("iat".to_string(), self.iat.to_string());
        set.insert("exp".to_string(), self.exp.to_string());
        set
    }
}

fn timestamp_to_datetime(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// 발급된 토큰과 그 클레임.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }
}

/// 토큰 발급/검증 에러.
///
/// `WeakSecret`, `InvalidTtl`, `ReservedClaim`, `Encoding`은 발급 측,
/// 나머지는 검증 측 에러입니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("서명 키가 너무 짧습니다 (최소 {min}바이트)")]
    WeakSecret { min: usize },
    #[error("토큰 유효 기간은 1초 이상이어야 합니다")]
    InvalidTtl,
    #[error("예약된 클레임은 덮어쓸 수 없습니다: {0}")]
    ReservedClaim(String),
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(String),
    #[error("잘못된 토큰 형식")]
    MalformedToken,
    #[error("서명이 일치하지 않습니다")]
    BadSignature,
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("발급자가 일치하지 않습니다")]
    IssuerMismatch,
    #[error("대상이 일치하지 않습니다")]
    AudienceMismatch,
}

impl TokenError {
    /// 로그/메트릭용 짧은 이름.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::WeakSecret { .. } => "weak_secret",
            TokenError::InvalidTtl => "invalid_ttl",
            TokenError::ReservedClaim(_) => "reserved_claim",
            TokenError::Encoding(_) => "encoding",
            TokenError::MalformedToken => "malformed_token",
            TokenError::BadSignature => "bad_signature",
            TokenError::Expired => "expired",
            TokenError::IssuerMismatch => "issuer_mismatch",
            TokenError::AudienceMismatch => "audience_mismatch",
        }
    }

}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            // 헤더가 다른 알고리즘을 주장하는 경우도 서명 불일치로 취급
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
            _ => TokenError::MalformedToken,
        }
    }
}

/// 토큰 코덱.
///
/// 생성 후에는 읽기 전용이므로 `Arc`로 공유해 동시에 호출해도 됩니다.
pub struct TokenCodec {
    issuer: String,
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("algorithm", &TOKEN_ALGORITHM)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// 시스템 시계를 사용하는 코덱 생성.
    pub fn new(
        secret: &SecretString,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Result<Self, TokenError> {
        Self::with_clock(secret, issuer, audience, Arc::new(SystemClock))
    }

    /// 지정한 시계를 사용하는 코덱 생성.
    pub fn with_clock(
        secret: &SecretString,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TokenError> {
        let secret = secret.expose_secret().as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_LEN,
            });
        }

        // 시간 관련 검사는 validate()에서 단일 시계 값으로 직접 수행
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            issuer: issuer.into(),
            audience: audience.into(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// 토큰 발급.
    ///
    /// `iat = now`, `exp = now + ttl`. 타임스탬프는 초 단위이므로 ttl도 초 단위로 절삭됩니다.
    pub fn issue(
        &self,
        subject: &str,
        role: &Role,
        extra: ClaimSet,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let ttl_secs = ttl.num_seconds();
        if ttl_secs < 1 {
            return Err(TokenError::InvalidTtl);
        }

        if let Some(name) = extra
            .keys()
            .find(|name| RESERVED_CLAIMS.contains(&name.as_str()))
        {
            return Err(TokenError::ReservedClaim(name.clone()));
        }

        let now = self.clock.now().timestamp();
        let exp = now.checked_add(ttl_secs).ok_or(TokenError::InvalidTtl)?;

        let claims = Claims {
            sub: subject.to_string(),
            role: Some(role.clone()),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp,
            extra,
        };

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// 토큰 검증 및 클레임 복원.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.iss != self.issuer {
            return Err(TokenError::IssuerMismatch);
        }
        if claims.aud != self.audience {
            return Err(TokenError::AudienceMismatch);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";
    const NOW: i64 = 1_700_000_000;

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    fn codec_at(clock: Arc<ManualClock>) -> TokenCodec {
        TokenCodec::with_clock(&secret(TEST_SECRET), "authgate", "authgate-clients", clock).unwrap()
    }

    fn replace_char(token: &str, index: usize) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_issue_and_validate() {
        let clock = Arc::new(ManualClock::at(NOW));
        let codec = codec_at(clock);

        let issued = codec
            .issue("admin", &Role::admin(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();
        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(issued.claims.iat, NOW);
        assert_eq!(issued.claims.exp, NOW + 60);
        assert_eq!(issued.expires_at().timestamp(), NOW + 60);

        let claims = codec.validate(&issued.token).unwrap();
        assert_eq!(claims, issued.claims);
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, Some(Role::admin()));
        assert_eq!(claims.iss, "authgate");
        assert_eq!(claims.aud, "authgate-clients");
    }

    #[test]
    fn test_extra_claims_survive() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));
        let mut extra = ClaimSet::new();
        extra.insert("department".to_string(), "ops".to_string());
        extra.insert("tenant".to_string(), "acme".to_string());

        let issued = codec
            .issue("user", &Role::user(), extra.clone(), Duration::minutes(5))
            .unwrap();
        let claims = codec.validate(&issued.token).unwrap();

        assert_eq!(claims.extra, extra);
        let set = claims.to_claim_set();
        assert_eq!(set["department"], "ops");
        assert_eq!(set["sub"], "user");
        assert_eq!(set["exp"], (NOW + 300).to_string());
    }

    #[test]
    fn test_altered_signature_rejected() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));
        let issued = codec
            .issue("admin", &Role::admin(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();

        let last = issued.token.len() - 1;
        let tampered = replace_char(&issued.token, last);
        assert_eq!(codec.validate(&tampered), Err(TokenError::BadSignature));

        let sig_start = issued.token.rfind('.').unwrap() + 1;
        let tampered = replace_char(&issued.token, sig_start);
        assert_eq!(codec.validate(&tampered), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_privilege_escalation_in_payload_rejected() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));
        let issued = codec
            .issue("user", &Role::user(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();

        let parts: Vec<&str> = issued.token.split('.').collect();
        let mut claims = issued.claims.clone();
        claims.role = Some(Role::admin());
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(codec.validate(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let clock = Arc::new(ManualClock::at(NOW));
        let issuer = codec_at(clock.clone());
        let other = TokenCodec::with_clock(
            &secret("another-secret-key-for-jwt-testing-32-chars"),
            "authgate",
            "authgate-clients",
            clock,
        )
        .unwrap();

        let issued = issuer
            .issue("admin", &Role::admin(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();
        assert_eq!(other.validate(&issued.token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_header_algorithm_is_not_trusted() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));
        let issued = codec
            .issue("admin", &Role::admin(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();

        // 같은 키로 다른 HMAC 알고리즘을 사용한 토큰
        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &issued.claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(codec.validate(&hs512), Err(TokenError::BadSignature));

        // 서명 없는 토큰
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&issued.claims).unwrap());
        let unsigned = format!("{}.{}.", header, payload);
        assert!(codec.validate(&unsigned).is_err());
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));

        for token in ["", "not-a-token", "a.b", "!!!.@@@.###"] {
            assert_eq!(
                codec.validate(token),
                Err(TokenError::MalformedToken),
                "token: {:?}",
                token
            );
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let clock = Arc::new(ManualClock::at(NOW));
        let codec = codec_at(clock.clone());
        let issued = codec
            .issue("admin", &Role::admin(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();

        clock.set(NOW + 59);
        assert!(codec.validate(&issued.token).is_ok());

        // 만료 시각과 정확히 같은 순간도 거부
        clock.set(NOW + 60);
        assert_eq!(codec.validate(&issued.token), Err(TokenError::Expired));

        clock.set(NOW + 3600);
        assert_eq!(codec.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_with_system_clock() {
        let codec =
            TokenCodec::new(&secret(TEST_SECRET), "authgate", "authgate-clients").unwrap();
        let issued = codec
            .issue("user", &Role::user(), ClaimSet::new(), Duration::seconds(1))
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(codec.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_issuer_and_audience_mismatch() {
        let clock = Arc::new(ManualClock::at(NOW));
        let codec = codec_at(clock.clone());
        let issued = codec
            .issue("admin", &Role::admin(), ClaimSet::new(), Duration::seconds(60))
            .unwrap();

        let other_issuer = TokenCodec::with_clock(
            &secret(TEST_SECRET),
            "someone-else",
            "authgate-clients",
            clock.clone(),
        )
        .unwrap();
        assert_eq!(
            other_issuer.validate(&issued.token),
            Err(TokenError::IssuerMismatch)
        );

        let other_audience =
            TokenCodec::with_clock(&secret(TEST_SECRET), "authgate", "other-clients", clock)
                .unwrap();
        assert_eq!(
            other_audience.validate(&issued.token),
            Err(TokenError::AudienceMismatch)
        );
    }

    #[test]
    fn test_issue_rejects_bad_input() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));

        assert_eq!(
            codec
                .issue("admin", &Role::admin(), ClaimSet::new(), Duration::zero())
                .unwrap_err(),
            TokenError::InvalidTtl
        );
        assert_eq!(
            codec
                .issue("admin", &Role::admin(), ClaimSet::new(), Duration::milliseconds(500))
                .unwrap_err(),
            TokenError::InvalidTtl
        );

        let mut extra = ClaimSet::new();
        extra.insert("role".to_string(), "admin".to_string());
        assert_eq!(
            codec
                .issue("user", &Role::user(), extra, Duration::seconds(60))
                .unwrap_err(),
            TokenError::ReservedClaim("role".to_string())
        );
    }

    #[test]
    fn test_weak_secret_rejected() {
        let result = TokenCodec::new(&secret("short"), "authgate", "authgate-clients");
        assert_eq!(
            result.unwrap_err(),
            TokenError::WeakSecret {
                min: MIN_SECRET_LEN
            }
        );
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(TokenError::BadSignature.kind(), "bad_signature");
        assert_eq!(TokenError::Expired.kind(), "expired");
        assert_eq!(TokenError::InvalidTtl.kind(), "invalid_ttl");
    }

    #[test]
    fn test_token_without_role_validates() {
        let codec = codec_at(Arc::new(ManualClock::at(NOW)));
        let payload = serde_json::json!({
            "sub": "svc",
            "iss": "authgate",
            "aud": "authgate-clients",
            "iat": NOW,
            "exp": NOW + 60,
        });
        let token = encode(
            &Header::new(TOKEN_ALGORITHM),
            &payload,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let claims = codec.validate(&token).unwrap();
        assert_eq!(claims.sub, "svc");
        assert_eq!(claims.role, None);
        assert!(!claims.to_claim_set().contains_key("role"));
    }
}
