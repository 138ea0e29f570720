use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::AppError;

/// セッショントークンのクレーム
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// アカウントID
    sub: i64,
    /// 発行時刻（unix秒）
    iat: i64,
    /// 失効時刻（unix秒）
    exp: i64,
}

/// セッションサービス
///
/// サインアップ成功時にアカウントIDを埋め込んだ署名付きトークンを発行する。
/// 保存（クッキー等）は外部のセッション層の責務。
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionService {
    /// シークレットは設定から明示的に渡す（グローバル状態は持たない）
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// アカウントIDを埋め込んだセッショントークンを発行
    pub fn issue(&self, account_id: i64) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: account_id,
            iat: now,
            exp: now + self.ttl_secs.max(1),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = ?e, "セッショントークン発行エラー");
            AppError::Internal(anyhow::anyhow!("session token encode error"))
        })
    }

    /// セッショントークンを検証してアカウントIDを返す
    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::TokenInvalid)?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify_returns_account_id() {
        let sessions = SessionService::new("test-secret", 3600);
        let token = sessions.issue(7).unwrap();
        assert_eq!(sessions.verify(&token).unwrap(), 7);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let sessions = SessionService::new("test-secret", 3600);
        let other = SessionService::new("other-secret", 3600);
        let token = sessions.issue(7).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let sessions = SessionService::new("test-secret", 3600);
        let mut token = sessions.issue(7).unwrap();
        token.push('x');
        assert!(sessions.verify(&token).is_err());
    }
}
