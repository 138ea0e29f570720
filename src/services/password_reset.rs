use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::config::Config;
use crate::error::AppError;
use crate::repositories::AccountStore;

/// 通知送信の薄い抽象（本番は SMTP、テストは記録用フェイク）
pub trait NotificationSender: Send + Sync {
    fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// トークン検証の結果
///
/// 3値は網羅的かつ相互排他
#[derive(Debug, PartialEq, Eq)]
pub enum TokenState {
    Invalid,
    Expired,
    Valid { account_id: i64 },
}

/// initiate_reset 成功時の確認情報
#[derive(Debug)]
pub struct ResetConfirmation {
    pub email: String,
    pub login_link: String,
}

const RESET_MAIL_SUBJECT: &str = "Password Reset Requested";

/// パスワードリセットワークフローコーディネーター
///
/// 厳密に順序付けられた4ステップ（トークン生成 → 存在確認 → 永続化 →
/// 通知送信）を直列の Result パイプラインとして実行する。
/// 旧実装のカウンター駆動コールバック連鎖は持ち込まない。
#[derive(Clone)]
pub struct PasswordResetService<S, N> {
    store: S,
    sender: N,
    config: Arc<Config>,
}

impl<S: AccountStore, N: NotificationSender> PasswordResetService<S, N> {
    pub fn new(store: S, sender: N, config: Arc<Config>) -> Self {
        Self {
            store,
            sender,
            config,
        }
    }

    /// パスワードリセットを開始
    ///
    /// 各ステップは前段の成功を前提とする。アカウント不在なら
    /// `AccountNotFound` で中断し、書き込みも送信も行わない。
    ///
    /// # Security
    /// トークン（平文）はログに出力しない
    pub async fn initiate_reset(
        &self,
        email: &str,
        origin_host: &str,
    ) -> Result<ResetConfirmation, AppError> {
        tracing::info!(email = %email, "パスワードリセットリクエスト");

        // 1. トークン生成（I/Oなし、必ず存在確認より前）
        //    不在アカウントなら無駄になるが、トークンがリクエスト間で
        //    再利用されることはない
        let token = generate_token();

        // 2. 存在確認
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AppError::AccountNotFound)?;

        let expires_at =
            OffsetDateTime::now_utc() + Duration::seconds(self.config.reset_token_ttl_secs);

        // 3. トークンと有効期限を永続化（既存トークンは上書き＝無効化）
        self.store
            .update_reset_token(account.id, &token, expires_at)
            .await?;

        // 4. 通知送信
        //    リンク形式はメール内リンクとの相互運用のため厳密に
        //    http://<host>/reset/<token> とする
        let reset_link = format!("http://{}/reset/{}", origin_host, token);
        let body = format!(
            "You are receiving this because you (or someone else) have requested \
             the reset of the password for your account.\n\n\
             Please click on the following link, or paste this into your browser \
             to complete the process:\n\n\
             {}\n\n\
             If you did not request this, please ignore this email and your \
             password will remain unchanged.\n",
            reset_link
        );

        // 旧実装は送信失敗時に応答が返らなかった。タイムアウトを設けて
        // 失敗は必ず Notification として呼び出し側へ返す
        let timeout = std::time::Duration::from_secs(self.config.notification_timeout_secs);
        match tokio::time::timeout(
            timeout,
            self.sender.send(&account.email, RESET_MAIL_SUBJECT, &body),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(AppError::Notification(format!(
                    "send timed out after {}s",
                    self.config.notification_timeout_secs
                )));
            }
        }

        tracing::info!(email = %account.email, "パスワードリセットメール送信完了");

        Ok(ResetConfirmation {
            login_link: format!("http://{}/login", origin_host),
            email: account.email,
        })
    }

    /// リセットトークンを検証
    ///
    /// ストアの等値インデックス検索で取得した値を、供給トークンと
    /// 定数時間比較してから有効期限を確認する
    pub async fn validate_token(&self, token: &str) -> Result<TokenState, AppError> {
        let Some(account) = self.store.find_by_token(token).await? else {
            return Ok(TokenState::Invalid);
        };

        let Some(stored) = account.reset_token.as_deref() else {
            return Ok(TokenState::Invalid);
        };
        if !constant_time_eq(stored, token) {
            return Ok(TokenState::Invalid);
        }

        match account.reset_token_expires_at {
            Some(expires_at) if OffsetDateTime::now_utc() > expires_at => {
                tracing::warn!(account_id = %account.id, "期限切れトークン");
                Ok(TokenState::Expired)
            }
            Some(_) => Ok(TokenState::Valid {
                account_id: account.id,
            }),
            // 永続化されていないトークンを有効とみなすことはない
            None => Ok(TokenState::Invalid),
        }
    }

    /// パスワードを更新し、トークンを即座に無効化
    ///
    /// 有効期限を epoch に強制することで「未期限切れ」チェックを二度と
    /// 通過できなくする（使用済みフラグなしの単回使用保証）。
    /// トークンの鮮度はフォーム描画時に検証済みであり、ここでは再検証しない
    ///
    /// # Security
    /// new_password はログに出力しない
    pub async fn complete_reset(
        &self,
        account_id: i64,
        new_password: &str,
    ) -> Result<(), AppError> {
        let password_hash = super::password::hash_password(new_password)?;

        self.store
            .update_credential(account_id, &password_hash, OffsetDateTime::UNIX_EPOCH)
            .await?;

        tracing::info!(account_id = %account_id, "パスワードリセット完了");

        Ok(())
    }
}

/// 20バイトの乱数をhexエンコードしたトークンを生成（160ビットのエントロピー）
fn generate_token() -> String {
    let mut bytes = [0u8; 20];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    let mut token = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(token, "{:02x}", b);
    }
    token
}

/// タイミングサイドチャネル耐性のある文字列比較
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.len() != b_bytes.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for i in 0..a_bytes.len() {
        diff |= a_bytes[i] ^ b_bytes[i];
    }
    diff == 0
}
