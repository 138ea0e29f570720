//! テスト用フェイクコラボレーター
//!
//! ストア/送信者のトレイト境界に対するインメモリ実装。
//! clone は内部状態を共有するため、テスト側からハンドル経由で観測できる。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use secrecy::SecretBox;
use time::OffsetDateTime;

use crate::config::Config;
use crate::error::AppError;
use crate::models::Account;
use crate::repositories::AccountStore;
use crate::services::NotificationSender;

pub fn test_config() -> Config {
    Config {
        database_url: SecretBox::new(Box::new("postgres://unused".to_string())),
        host: "127.0.0.1".to_string(),
        port: 0,
        public_host: Some("app.example".to_string()),
        smtp_host: None,
        smtp_port: 587,
        smtp_username: None,
        smtp_password: None,
        mail_from_address: "admin@ec3taskmanagement.com".to_string(),
        reset_token_ttl_secs: 3600,
        notification_timeout_secs: 5,
        session_secret: SecretBox::new(Box::new("test-secret".to_string())),
        session_ttl_secs: 3600,
    }
}

#[derive(Default)]
struct MemoryState {
    accounts: Vec<Account>,
    next_id: i64,
    writes: usize,
}

/// インメモリのアカウントストア
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, id: i64, name: &str, email: &str, password_hash: &str) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(id);
        state.accounts.push(Account {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            reset_token: None,
            reset_token_expires_at: None,
        });
    }

    pub fn set_reset_token(&self, id: i64, token: &str, expires_at: OffsetDateTime) {
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .expect("unknown account id");
        account.reset_token = Some(token.to_string());
        account.reset_token_expires_at = Some(expires_at);
    }

    pub fn get(&self, id: i64) -> Option<Account> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// ワークフロー経由の書き込み回数（テストのセットアップは数えない）
    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes
    }
}

impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Account>, AppError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_reset_token(
        &self,
        id: i64,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::StoreWrite(anyhow::anyhow!("no account {}", id)))?;
        account.reset_token = Some(token.to_string());
        account.reset_token_expires_at = Some(expires_at);
        Ok(())
    }

    async fn update_credential(
        &self,
        id: i64,
        password_hash: &str,
        invalidated_expiry: OffsetDateTime,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::StoreWrite(anyhow::anyhow!("no account {}", id)))?;
        account.password_hash = password_hash.to_string();
        account.reset_token_expires_at = Some(invalidated_expiry);
        Ok(())
    }

    async fn insert_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.accounts.iter().any(|a| a.email == email) {
            // 本番ストアのUNIQUE制約に相当
            return Err(AppError::EmailAlreadyRegistered);
        }
        state.writes += 1;
        state.next_id += 1;
        let id = state.next_id;
        state.accounts.push(Account {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            reset_token: None,
            reset_token_expires_at: None,
        });
        Ok(id)
    }
}

/// 送信内容を記録するフェイク
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

impl NotificationSender for RecordingSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// 常に失敗する送信者
#[derive(Clone)]
pub struct FailingSender;

impl NotificationSender for FailingSender {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), AppError> {
        Err(AppError::Notification("smtp unreachable".to_string()))
    }
}

/// 応答しない送信者（タイムアウト検証用）
#[derive(Clone)]
pub struct SlowSender {
    delay: Duration,
}

impl SlowSender {
    pub fn secs(secs: u64) -> Self {
        Self {
            delay: Duration::from_secs(secs),
        }
    }
}

impl NotificationSender for SlowSender {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
