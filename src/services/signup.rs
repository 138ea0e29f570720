use crate::error::AppError;
use crate::repositories::AccountStore;
use crate::services::SessionService;
use crate::services::password::hash_password;

/// サインアップ成功時の結果
#[derive(Debug)]
pub struct SignupOutcome {
    pub account_id: i64,
    /// アカウントIDを埋め込んだ署名付きセッショントークン。
    /// 保存は呼び出し側（外部のセッション層）が行う
    pub session_token: String,
}

/// サインアップサービス
#[derive(Clone)]
pub struct SignupService<S> {
    store: S,
    sessions: SessionService,
}

impl<S: AccountStore> SignupService<S> {
    pub fn new(store: S, sessions: SessionService) -> Self {
        Self { store, sessions }
    }

    /// アカウントを作成
    ///
    /// 存在確認はリセットワークフローの逆: 既存なら
    /// `EmailAlreadyRegistered` で中断し、既存アカウントには触れない。
    ///
    /// # Security
    /// パスワードは即座にハッシュ化し、ログに出力しない
    pub async fn create_account(
        &self,
        email: &str,
        full_name: &str,
        password: &str,
    ) -> Result<SignupOutcome, AppError> {
        if self.store.find_by_email(email).await?.is_some() {
            tracing::info!(email = %email, "サインアップ拒否: メールアドレス重複");
            return Err(AppError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(password)?;

        // 存在確認と挿入の間の競合はストア側のUNIQUE制約が受け止める
        let account_id = self
            .store
            .insert_account(full_name, email, &password_hash)
            .await?;

        let session_token = self.sessions.issue(account_id)?;

        tracing::info!(email = %email, account_id = %account_id, "アカウント作成成功");

        Ok(SignupOutcome {
            account_id,
            session_token,
        })
    }
}
